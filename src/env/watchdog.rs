/*!
 * Reload Watchdog
 * Polls the selected environment's fingerprint and broadcasts a reload signal on change
 */

use super::registry::ActiveEnv;
use crate::core::limits::RELOAD_CHANNEL_CAPACITY;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

/// Emitted when the selected environment or its variable set changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReloadSignal {
    pub env: String,
    pub previous: u64,
    pub fingerprint: u64,
}

pub struct ReloadWatchdog {
    active: watch::Receiver<ActiveEnv>,
    interval: Duration,
    /// Name and fingerprint of the environment seen on the last check
    last: Mutex<(String, u64)>,
    tx: broadcast::Sender<ReloadSignal>,
}

impl ReloadWatchdog {
    /// Watch whichever environment is published on `active`
    pub fn new(active: watch::Receiver<ActiveEnv>, interval: Duration) -> Self {
        let (tx, _) = broadcast::channel(RELOAD_CHANNEL_CAPACITY);
        let seen = {
            let env = active.borrow();
            (env.name.clone(), env.vars.fingerprint())
        };
        Self {
            active,
            interval,
            last: Mutex::new(seen),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadSignal> {
        self.tx.subscribe()
    }

    /// Name of the environment currently watched
    pub fn watching(&self) -> String {
        self.last.lock().0.clone()
    }

    /// Compare the selected environment with the last one seen, signalling on change
    pub fn check(&self) -> Option<ReloadSignal> {
        let env = self.active.borrow().clone();
        let fingerprint = env.vars.fingerprint();

        let signal = {
            let mut last = self.last.lock();
            if last.0 == env.name && last.1 == fingerprint {
                return None;
            }
            if last.0 != env.name {
                info!(from = %last.0, to = %env.name, "Watchdog now follows environment");
            }
            let signal = ReloadSignal {
                env: env.name.clone(),
                previous: last.1,
                fingerprint,
            };
            *last = (env.name, fingerprint);
            signal
        };

        // No subscribers is not an error, the change is still recorded
        let receivers = self.tx.send(signal.clone()).unwrap_or(0);
        debug!(receivers, env = %signal.env, fingerprint, "Environment changed, reload signalled");
        Some(signal)
    }

    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!("Reload watchdog started with {:?} interval", self.interval);

        loop {
            interval.tick().await;
            self.check();
        }
    }
}
