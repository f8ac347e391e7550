/*!
 * Supervised Tasks
 * Runs a background loop and restarts it if it panics
 */

use crate::core::limits::SUPERVISOR_RESTART_DELAY;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Control messages for a supervised task
#[derive(Debug, Clone)]
pub enum SupervisorCommand {
    /// Abort the running loop and stop supervising
    Shutdown,
}

/// Handle to a supervised background task
pub struct SupervisedTask {
    name: String,
    command_tx: mpsc::UnboundedSender<SupervisorCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
    restarts: Arc<AtomicU64>,
}

impl SupervisedTask {
    /// Spawn `factory()` under supervision with the default restart delay
    pub fn spawn<F, Fut>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_with_delay(name, SUPERVISOR_RESTART_DELAY, factory)
    }

    pub fn spawn_with_delay<F, Fut>(name: impl Into<String>, restart_delay: Duration, factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let restarts = Arc::new(AtomicU64::new(0));

        let handle = tokio::spawn(supervise(
            name.clone(),
            factory,
            restart_delay,
            Arc::clone(&restarts),
            command_rx,
        ));

        info!(task = %name, "Supervised task spawned");

        Self {
            name,
            command_tx,
            handle: Some(handle),
            restarts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of times the loop was restarted after a panic
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }

    /// True once the supervisor itself has stopped
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Stop the loop and wait for the supervisor to exit
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(SupervisorCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(task = %self.name, error = %e, "Supervised task shutdown error");
            } else {
                info!(task = %self.name, "Supervised task shutdown complete");
            }
        }
    }
}

async fn supervise<F, Fut>(
    name: String,
    factory: F,
    restart_delay: Duration,
    restarts: Arc<AtomicU64>,
    mut command_rx: mpsc::UnboundedReceiver<SupervisorCommand>,
) where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        let mut child = tokio::spawn(factory());

        tokio::select! {
            result = &mut child => match result {
                Ok(()) => {
                    info!(task = %name, "Supervised task finished");
                    return;
                }
                Err(e) if e.is_panic() => {
                    let count = restarts.fetch_add(1, Ordering::Relaxed) + 1;
                    error!(task = %name, restarts = count, "Supervised task panicked, restarting");
                }
                Err(e) => {
                    warn!(task = %name, error = %e, "Supervised task cancelled");
                    return;
                }
            },

            Some(SupervisorCommand::Shutdown) = command_rx.recv() => {
                child.abort();
                info!(task = %name, "Supervised task stopping");
                return;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(restart_delay) => {}
            Some(SupervisorCommand::Shutdown) = command_rx.recv() => return,
        }
    }
}

impl Drop for SupervisedTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.command_tx.send(SupervisorCommand::Shutdown);
        }
    }
}
