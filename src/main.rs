/*!
 * kubed-sh - Main Entry Point
 *
 * Interactive shell that launches programs as cluster workloads:
 * - Distributed process table seeded from the cluster
 * - Background reconciliation of stale entries
 * - Named environments with a change watchdog on the selected one
 * - Script mode (file argument or piped stdin)
 */

use anyhow::Context;
use kubed_sh::process::run_preflight;
use kubed_sh::{
    init_tracing, DProcTable, Environments, Gateway, KubectlGateway, Orchestrator, Reconciler,
    ReloadWatchdog, Shell, ShellConfig, SupervisedTask,
};
use std::io::{IsTerminal, Read};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ShellConfig::from_env();
    init_tracing(&config);
    debug!(config = ?config, "kubed-sh starting");

    let gateway: Arc<dyn Gateway> = Arc::new(KubectlGateway::from_config(&config));

    // Seed the process table from the cluster; an empty table is fine
    let dpt = Arc::new(DProcTable::new());
    {
        let dpt = Arc::clone(&dpt);
        let gateway = Arc::clone(&gateway);
        match tokio::task::spawn_blocking(move || dpt.build(gateway.as_ref())).await? {
            Ok(count) => info!(count, "Process table seeded"),
            Err(e) => eprintln!("{}", e),
        }
    }

    // The global environment is created and selected
    let envs = Arc::new(Environments::new());
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&dpt),
        Arc::clone(&gateway),
        config.launch.clone(),
    ));

    let script = read_script_input()?;

    let shell = {
        let gateway = Arc::clone(&gateway);
        let orchestrator = Arc::clone(&orchestrator);
        let envs = Arc::clone(&envs);
        let launch = config.launch.clone();
        let shell = tokio::task::spawn_blocking(move || {
            Shell::new(gateway, orchestrator, envs, launch)
        })
        .await?;
        Arc::new(shell)
    };

    if let Some(script) = script {
        let shell = Arc::clone(&shell);
        tokio::task::spawn_blocking(move || shell.run_script(&script, &mut std::io::stdout()))
            .await?
            .context("Error executing script")?;
        return Ok(());
    }

    // Interactive session: check the client and warm the image cache first
    {
        let gateway = Arc::clone(&gateway);
        let launch = config.launch.clone();
        let prepull = !config.no_prepull;
        match tokio::task::spawn_blocking(move || run_preflight(gateway.as_ref(), &launch, prepull)).await? {
            Ok(pulled) => debug!(pulled, "Preflight complete"),
            Err(e) => {
                warn!(error = %e, "Preflight failed");
                eprintln!("Encountered issues during startup: {}", e);
            }
        }
    }

    // Background tasks run alongside the command loop
    let reconciler = Arc::new(Reconciler::new(
        Arc::clone(&dpt),
        Arc::clone(&gateway),
        config.gc_interval,
    ));
    let gc_task = SupervisedTask::spawn("reconciler", move || Arc::clone(&reconciler).run());

    let watchdog = Arc::new(ReloadWatchdog::new(envs.subscribe(), config.watch_interval));
    let mut reloads = watchdog.subscribe();
    let watch_task = SupervisedTask::spawn("reload-watchdog", move || Arc::clone(&watchdog).run());

    tokio::spawn(async move {
        while let Ok(signal) = reloads.recv().await {
            info!(env = %signal.env, fingerprint = signal.fingerprint, "Environment changed, hot-reload requested");
        }
    });

    // Keep a cascaded Ctrl+C from killing the session
    tokio::spawn(async {
        while tokio::signal::ctrl_c().await.is_ok() {
            debug!("Caught a cascaded Ctrl+C, ignoring it");
        }
    });

    let repl = Arc::clone(&shell);
    let result = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        repl.run_interactive(stdin.lock(), &mut std::io::stdout())
    })
    .await?;

    gc_task.shutdown().await;
    watch_task.shutdown().await;

    if let Err(e) = result {
        warn!(error = %e, "Interactive session ended with an error");
        return Err(e.into());
    }
    Ok(())
}

/// Script from a file argument or from piped stdin; None for an interactive terminal
fn read_script_input() -> anyhow::Result<Option<String>> {
    if let Some(path) = std::env::args().nth(1) {
        let script = std::fs::read_to_string(&path)
            .with_context(|| format!("Error reading script {}", path))?;
        return Ok(Some(script));
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut script = String::new();
    stdin
        .lock()
        .read_to_string(&mut script)
        .context("Error reading from stdin")?;
    Ok(Some(script))
}
