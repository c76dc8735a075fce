//! SeaORM-based Stream repository
//!
//! All reads and writes for stream rows. The two lifecycle transitions
//! (`mark_started`, `mark_ended_*`) are single predicate-qualified updates:
//! the `WHERE` clause is the concurrency guard, and a transition whose
//! predicate matches zero rows has simply lost the race.

use chrono::Utc;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{prelude::Streams, streams};
use crate::errors::{AppError, AppResult};
use crate::models::{ActiveStreamEntry, FinishedStreamEntry, Stream, StreamCreateRequest};

/// SeaORM-based repository for stream lifecycle state
#[derive(Clone)]
pub struct StreamSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl StreamSeaOrmRepository {
    /// Create a new repository instance
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Insert a pending stream. No broadcast id, no timestamps yet.
    pub async fn create(&self, request: StreamCreateRequest) -> AppResult<Stream> {
        if request.user_id.is_nil() {
            return Err(AppError::validation("user_id must be set"));
        }
        if request.stream_key.trim().is_empty() {
            return Err(AppError::validation("stream_key must not be empty"));
        }
        if request.title.trim().is_empty() {
            return Err(AppError::validation("title must not be empty"));
        }

        let now = Utc::now();
        let active_model = streams::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(request.user_id),
            stream_key: Set(request.stream_key.clone()),
            broadcast_id: Set(None),
            title: Set(request.title.clone()),
            preview: Set(request.preview.clone()),
            start: Set(None),
            end: Set(None),
            path: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&*self.connection).await?;
        Ok(model.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Stream>> {
        Ok(Streams::find_by_id(id)
            .one(&*self.connection)
            .await?
            .map(Into::into))
    }

    /// Look up a stream by its publisher credential.
    ///
    /// A publisher reuses the same key across broadcast attempts, so several
    /// rows may share it; the newest row wins.
    pub async fn find_by_stream_key(&self, stream_key: &str) -> AppResult<Option<Stream>> {
        Ok(Streams::find()
            .filter(streams::Column::StreamKey.eq(stream_key))
            .order_by_desc(streams::Column::CreatedAt)
            .one(&*self.connection)
            .await?
            .map(Into::into))
    }

    /// All rows without an end timestamp, projected down to the public
    /// listing fields.
    pub async fn find_active(&self) -> AppResult<Vec<ActiveStreamEntry>> {
        Ok(Streams::find()
            .select_only()
            .column(streams::Column::Id)
            .column(streams::Column::BroadcastId)
            .column(streams::Column::Title)
            .column(streams::Column::Start)
            .column(streams::Column::StreamKey)
            .column(streams::Column::Preview)
            .filter(streams::Column::End.is_null())
            .into_model::<ActiveStreamEntry>()
            .all(&*self.connection)
            .await?)
    }

    /// Open sessions eligible for reconciliation: no end yet, but confirmed
    /// live at some point. Pending rows have no broadcast id to probe.
    pub async fn find_open_started(&self) -> AppResult<Vec<Stream>> {
        Ok(Streams::find()
            .filter(streams::Column::End.is_null())
            .filter(streams::Column::Start.is_not_null())
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Finished streams for the given users, most recently updated first.
    pub async fn find_finished_for_users(
        &self,
        user_ids: &[Uuid],
    ) -> AppResult<Vec<FinishedStreamEntry>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Streams::find()
            .select_only()
            .column(streams::Column::Id)
            .column(streams::Column::BroadcastId)
            .column(streams::Column::Title)
            .column(streams::Column::Start)
            .column(streams::Column::Path)
            .column(streams::Column::UserId)
            .column(streams::Column::Preview)
            .filter(streams::Column::Path.is_not_null())
            .filter(streams::Column::UserId.is_in(user_ids.iter().copied()))
            .order_by_desc(streams::Column::UpdatedAt)
            .into_model::<FinishedStreamEntry>()
            .all(&*self.connection)
            .await?)
    }

    /// Distinct users with at least one recorded broadcast, capped at `limit`.
    pub async fn find_distinct_broadcasting_users(&self, limit: u64) -> AppResult<Vec<Uuid>> {
        Ok(Streams::find()
            .select_only()
            .column(streams::Column::UserId)
            .distinct()
            .filter(streams::Column::Path.is_not_null())
            .limit(limit)
            .into_tuple::<Uuid>()
            .all(&*self.connection)
            .await?)
    }

    /// Single transition point from pending to active.
    ///
    /// The `broadcast_id IS NULL` predicate is the concurrency guard: a
    /// stream that already went live matches zero rows and the attempt
    /// surfaces as a conflict. Returns the freshly re-read row so the caller
    /// observes the server-assigned timestamps.
    pub async fn mark_started(&self, stream_id: Uuid, broadcast_id: &str) -> AppResult<Stream> {
        let now = Utc::now();
        let result = Streams::update_many()
            .col_expr(streams::Column::Start, Expr::value(now))
            .col_expr(streams::Column::BroadcastId, Expr::value(broadcast_id))
            .col_expr(streams::Column::UpdatedAt, Expr::value(now))
            .filter(streams::Column::Id.eq(stream_id))
            .filter(streams::Column::BroadcastId.is_null())
            .exec(&*self.connection)
            .await?;

        if result.rows_affected == 0 {
            return match self.find_by_id(stream_id).await? {
                Some(stream) => Err(AppError::conflict(format!(
                    "stream {} is already bound to broadcast {}",
                    stream_id,
                    stream.broadcast_id.as_deref().unwrap_or("<unknown>")
                ))),
                None => Err(AppError::not_found("stream", stream_id)),
            };
        }

        self.find_by_id(stream_id)
            .await?
            .ok_or_else(|| AppError::not_found("stream", stream_id))
    }

    /// Finish the stream currently holding `broadcast_id`.
    pub async fn mark_ended_by_broadcast_id(
        &self,
        broadcast_id: &str,
        path: &str,
    ) -> AppResult<u64> {
        self.mark_ended(streams::Column::BroadcastId.eq(broadcast_id), path)
            .await
    }

    /// Finish a stream by primary key; recovery path used by the sweep.
    pub async fn mark_ended_by_id(&self, stream_id: Uuid, path: &str) -> AppResult<u64> {
        self.mark_ended(streams::Column::Id.eq(stream_id), path).await
    }

    /// Zero matches is success, not an error: duplicate or late end signals
    /// must stay quiet.
    async fn mark_ended(&self, predicate: SimpleExpr, path: &str) -> AppResult<u64> {
        let now = Utc::now();
        let result = Streams::update_many()
            .col_expr(streams::Column::End, Expr::value(now))
            .col_expr(streams::Column::Path, Expr::value(path))
            .col_expr(streams::Column::UpdatedAt, Expr::value(now))
            .filter(predicate)
            .filter(streams::Column::End.is_null())
            .filter(streams::Column::Start.is_not_null())
            .exec(&*self.connection)
            .await?;

        Ok(result.rows_affected)
    }
}
