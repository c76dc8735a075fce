//! Stream session lifecycle core
//!
//! Owns the pending -> active -> finished transitions and the recovery sweep
//! that closes sessions whose end-of-broadcast notification never arrived.
//! Both transitions delegate to predicate-qualified updates, so a genuine
//! end signal racing a sweep for the same stream resolves at the store: the
//! loser's predicate matches zero rows.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use sea_orm::DatabaseConnection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::repositories::StreamSeaOrmRepository;
use crate::errors::{AppError, AppResult};
use crate::models::Stream;
use crate::services::session_probe::{ProbeOutcome, SessionProbe};

/// Aggregate result of one reconciliation sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Open sessions examined.
    pub examined: usize,
    /// Sessions transitioned to finished.
    pub closed: usize,
    /// Sessions the ingest server still reports live.
    pub still_live: usize,
    /// Sessions whose probe failed; left open until the next sweep.
    pub probe_failures: usize,
}

/// Lifecycle state machine for stream sessions.
pub struct SessionReconciler {
    streams: StreamSeaOrmRepository,
    sweep_in_progress: AtomicBool,
}

impl SessionReconciler {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self {
            streams: StreamSeaOrmRepository::new(connection),
            sweep_in_progress: AtomicBool::new(false),
        }
    }

    /// Bind a broadcast id to a pending stream; the single transition point
    /// from pending to active. Returns the freshly-read row so the caller
    /// observes the assigned timestamps.
    pub async fn start_stream(&self, broadcast_id: &str, stream_id: Uuid) -> AppResult<Stream> {
        let stream = self.streams.mark_started(stream_id, broadcast_id).await?;
        info!(%stream_id, broadcast_id, "stream went live");
        Ok(stream)
    }

    /// Finish the stream currently bound to `broadcast_id`, stamping the end
    /// timestamp and the recording path. Safe to call more than once: a
    /// duplicate or late signal matches zero rows and returns 0.
    pub async fn end_stream(&self, broadcast_id: &str, path: &str) -> AppResult<u64> {
        let closed = self
            .streams
            .mark_ended_by_broadcast_id(broadcast_id, path)
            .await?;
        if closed == 0 {
            debug!(broadcast_id, "end signal matched no open stream");
        } else {
            info!(broadcast_id, path, "stream finished");
        }
        Ok(closed)
    }

    /// Recovery sweep: reconcile every open session against ingest-server
    /// ground truth and close the ones that are actually dead.
    ///
    /// Probes fan out concurrently and all complete before any update is
    /// issued; outcomes are paired back to streams by stream id. A failing
    /// probe only skips its own stream. Store write failures surface after
    /// the whole batch has settled.
    pub async fn close_lost_streams(&self, probe: &dyn SessionProbe) -> AppResult<SweepReport> {
        if self
            .sweep_in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::OperationInProgress {
                operation: "lost-stream sweep".to_string(),
            });
        }
        let _guard = SweepGuard(&self.sweep_in_progress);

        let open = self.streams.find_open_started().await?;
        let mut report = SweepReport {
            examined: open.len(),
            ..SweepReport::default()
        };
        if open.is_empty() {
            return Ok(report);
        }

        let probes = open
            .iter()
            .map(|stream| async move { (stream.id, probe.probe(stream).await) });
        let outcomes = join_all(probes).await;

        let mut to_close = Vec::new();
        for (stream_id, outcome) in outcomes {
            match outcome {
                Ok(ProbeOutcome::Ended { path }) => to_close.push((stream_id, path)),
                Ok(ProbeOutcome::Live) => report.still_live += 1,
                Err(error) => {
                    warn!(%stream_id, %error, "probe failed, leaving stream open");
                    report.probe_failures += 1;
                }
            }
        }

        let updates = to_close.iter().map(|(stream_id, path)| {
            let streams = &self.streams;
            async move { (*stream_id, streams.mark_ended_by_id(*stream_id, path).await) }
        });

        let mut first_failure = None;
        for (stream_id, result) in join_all(updates).await {
            match result {
                Ok(0) => debug!(%stream_id, "already closed by a racing end signal"),
                Ok(_) => report.closed += 1,
                Err(error) => {
                    warn!(%stream_id, %error, "failed to close lost stream");
                    if first_failure.is_none() {
                        first_failure = Some(error);
                    }
                }
            }
        }
        if let Some(error) = first_failure {
            return Err(error);
        }

        info!(
            examined = report.examined,
            closed = report.closed,
            still_live = report.still_live,
            probe_failures = report.probe_failures,
            "lost-stream sweep finished"
        );
        Ok(report)
    }
}

struct SweepGuard<'a>(&'a AtomicBool);

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
