//! Orchestration facade exposed to the web layer
//!
//! Bundles the repository, the tag associator, the reconciler and the read
//! views behind the operations the platform actually performs.

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::database::repositories::StreamSeaOrmRepository;
use crate::errors::{AppError, AppResult};
use crate::models::{ActiveStreamEntry, FinishedStreamEntry, Stream, StreamCreateRequest};
use crate::services::session_probe::SessionProbe;
use crate::services::session_reconciler::{SessionReconciler, SweepReport};
use crate::services::tag_associator::TagAssociator;
use crate::views::{ActiveStreamView, HistoryView};

pub struct StreamService {
    streams: StreamSeaOrmRepository,
    tags: TagAssociator,
    reconciler: Arc<SessionReconciler>,
    active_view: ActiveStreamView,
    history_view: HistoryView,
}

impl StreamService {
    pub fn new(connection: Arc<DatabaseConnection>, reconciler: Arc<SessionReconciler>) -> Self {
        Self {
            streams: StreamSeaOrmRepository::new(connection.clone()),
            tags: TagAssociator::new(connection.clone()),
            active_view: ActiveStreamView::new(connection.clone()),
            history_view: HistoryView::new(connection),
            reconciler,
        }
    }

    /// Create a pending stream and attach its tags.
    pub async fn create_stream(
        &self,
        request: StreamCreateRequest,
        tag_ids: &[Uuid],
    ) -> AppResult<Stream> {
        let stream = self.streams.create(request).await?;
        let attached = self.tags.attach(stream.id, tag_ids).await?;
        info!(stream_id = %stream.id, user_id = %stream.user_id, attached, "stream created");
        Ok(stream)
    }

    pub async fn get_stream(&self, stream_id: Uuid) -> AppResult<Stream> {
        self.streams
            .find_by_id(stream_id)
            .await?
            .ok_or_else(|| AppError::not_found("stream", stream_id))
    }

    pub async fn start_stream(&self, broadcast_id: &str, stream_id: Uuid) -> AppResult<Stream> {
        self.reconciler.start_stream(broadcast_id, stream_id).await
    }

    /// Publish-callback path: the ingest server identifies the publisher by
    /// stream key, not by stream id.
    pub async fn start_stream_by_key(
        &self,
        broadcast_id: &str,
        stream_key: &str,
    ) -> AppResult<Stream> {
        let stream = self
            .streams
            .find_by_stream_key(stream_key)
            .await?
            .ok_or_else(|| AppError::not_found("stream", stream_key))?;
        self.reconciler.start_stream(broadcast_id, stream.id).await
    }

    pub async fn end_stream(&self, broadcast_id: &str, path: &str) -> AppResult<u64> {
        self.reconciler.end_stream(broadcast_id, path).await
    }

    pub async fn list_active_streams(&self) -> AppResult<Vec<ActiveStreamEntry>> {
        self.active_view.list().await
    }

    pub async fn list_user_history(&self, user_id: Uuid) -> AppResult<Vec<FinishedStreamEntry>> {
        self.history_view.for_user(user_id).await
    }

    pub async fn list_broadcasting_users(&self, limit: u64) -> AppResult<Vec<Uuid>> {
        self.history_view.broadcasting_users(limit).await
    }

    /// One-shot reconciliation sweep; normally driven by the background
    /// sweeper rather than a user-facing request.
    pub async fn sweep_lost_streams(&self, probe: &dyn SessionProbe) -> AppResult<SweepReport> {
        self.reconciler.close_lost_streams(probe).await
    }
}
