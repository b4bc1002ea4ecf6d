use anyhow::Result;
use guest_agent::*;
use std::io::BufRead;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// Reads one JSON `HostCommand` per stdin line and dispatches it. Runs on its own thread so a
/// pending read never holds up runtime shutdown.
fn command_loop(dispatcher: commands::CommandDispatcher) {
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "reading commands from stdin failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<commands::HostCommand>(&line) {
            Ok(command) => {
                let outcome = dispatcher.dispatch(&command);
                tracing::info!(command = command.name(), ?outcome, "command dispatched");
            }
            Err(e) => tracing::warn!(error = %e, "ignoring malformed command"),
        }
    }
    tracing::debug!("command input closed");
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let once = std::env::args().skip(1).any(|a| a == "--once");
    let app_config = config::AppConfig::load()?;
    tracing::info!(name = version::NAME, version = version::VERSION, "starting");

    let runner: Arc<dyn process::ProcessRunner> = Arc::new(process::SystemRunner);
    let collector = Arc::new(Mutex::new(collector::DataCollector::probe(
        &app_config,
        runner.clone(),
    )));

    if once {
        let report = worker::collect_report(collector).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let dispatcher = commands::CommandDispatcher::new(
        app_config.commands.clone(),
        runner,
        Arc::new(commands::NullCredentialSink),
    );
    std::thread::Builder::new()
        .name("commands".into())
        .spawn(move || command_loop(dispatcher))?;

    let (tx, mut rx) = broadcast::channel::<models::GuestReport>(16);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            collector,
            tx,
            shutdown_rx,
        },
        worker::WorkerConfig {
            report_interval_secs: app_config.general.report_interval_secs,
            stats_log_interval_secs: app_config.general.stats_log_interval_secs,
        },
    );

    let printer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(report) => match serde_json::to_string(&report) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::warn!(error = %e, "report serialization failed"),
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "report printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    shutdown_signal().await;
    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = worker_handle.await;
    let _ = printer.await;

    Ok(())
}
