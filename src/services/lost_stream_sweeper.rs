//! Background reconciliation sweeper
//!
//! Runs the lost-stream sweep on a fixed interval until cancelled. Sweep
//! failures are logged for operators and never surface to end users; the
//! next tick simply tries again.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::errors::AppError;
use crate::services::session_probe::SessionProbe;
use crate::services::session_reconciler::SessionReconciler;

/// Periodic lost-stream sweep service
pub struct LostStreamSweeper {
    reconciler: Arc<SessionReconciler>,
    probe: Arc<dyn SessionProbe>,
    sweep_interval: Duration,
}

impl LostStreamSweeper {
    pub fn new(
        reconciler: Arc<SessionReconciler>,
        probe: Arc<dyn SessionProbe>,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            reconciler,
            probe,
            sweep_interval,
        }
    }

    /// Run the sweeper until the cancellation token fires.
    pub async fn run(&self, cancellation_token: CancellationToken) {
        info!(interval = ?self.sweep_interval, "starting lost-stream sweeper");
        let mut sweep_tick = interval(self.sweep_interval);

        // Skip the first immediate tick to avoid sweeping right at startup
        sweep_tick.tick().await;

        loop {
            tokio::select! {
                _ = sweep_tick.tick() => {
                    self.sweep_once().await;
                }
                _ = cancellation_token.cancelled() => {
                    info!("lost-stream sweeper received cancellation signal, shutting down");
                    break;
                }
            }
        }

        info!("lost-stream sweeper stopped");
    }

    async fn sweep_once(&self) {
        match self.reconciler.close_lost_streams(self.probe.as_ref()).await {
            Ok(report) if report.examined == 0 => {
                debug!("no open sessions to reconcile");
            }
            Ok(report) => {
                info!(
                    examined = report.examined,
                    closed = report.closed,
                    still_live = report.still_live,
                    probe_failures = report.probe_failures,
                    "reconciliation sweep completed"
                );
            }
            Err(AppError::OperationInProgress { .. }) => {
                debug!("previous sweep still running, skipping this tick");
            }
            Err(error) => {
                error!(%error, "reconciliation sweep failed");
            }
        }
    }
}
