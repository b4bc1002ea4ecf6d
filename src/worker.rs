// Background report worker: periodically reads every guest fact and publishes a GuestReport.
// Collection runs on the blocking pool; the collector is only ever sampled by this task.

use crate::collector::DataCollector;
use crate::models::GuestReport;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::time::{Duration, interval};
use tracing::instrument;

/// Collector, output channel, and shutdown for the worker.
pub struct WorkerDeps {
    pub collector: Arc<Mutex<DataCollector>>,
    pub tx: broadcast::Sender<GuestReport>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing config.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub report_interval_secs: u64,
    /// How often to log agent stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Builds one report on the blocking pool.
pub async fn collect_report(collector: Arc<Mutex<DataCollector>>) -> anyhow::Result<GuestReport> {
    tokio::task::spawn_blocking(move || {
        let mut collector = collector
            .lock()
            .map_err(|e| anyhow::anyhow!("collector lock poisoned: {}", e))?;
        Ok(collector.report())
    })
    .await
    .map_err(|e| anyhow::anyhow!("collector task join: {}", e))?
}

/// Spawns the report worker. Returns a join handle that completes after shutdown.
pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run(deps, config))
}

#[instrument(skip_all, fields(report_interval_secs = config.report_interval_secs))]
async fn run(deps: WorkerDeps, config: WorkerConfig) {
    let WorkerDeps {
        collector,
        tx,
        mut shutdown_rx,
    } = deps;

    let mut tick = interval(Duration::from_secs(config.report_interval_secs));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut stats_log_tick = interval(Duration::from_secs(config.stats_log_interval_secs));
    stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut reports_total: u64 = 0;
    let mut reports_failed: u64 = 0;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let report = match collect_report(collector.clone()).await {
                    Ok(r) => r,
                    Err(e) => {
                        reports_failed += 1;
                        tracing::warn!(
                            error = %e,
                            operation = "collect_report",
                            "report collection failed"
                        );
                        continue;
                    }
                };
                reports_total += 1;
                if tx.send(report).is_err() {
                    tracing::debug!(
                        operation = "publish_report",
                        "report channel has no receivers"
                    );
                }
            }
            _ = &mut shutdown_rx => {
                tracing::debug!("Worker shutting down");
                break;
            }
            _ = stats_log_tick.tick() => {
                tracing::info!(reports_total, reports_failed, "agent stats");
            }
        }
    }
}
