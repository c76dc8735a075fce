//! Read-only query facets for the presentation layer
//!
//! Pure projections over the stream repository; no independent state.

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::repositories::StreamSeaOrmRepository;
use crate::errors::AppResult;
use crate::models::{ActiveStreamEntry, FinishedStreamEntry};

/// Public listing of currently-open streams.
#[derive(Clone)]
pub struct ActiveStreamView {
    streams: StreamSeaOrmRepository,
}

impl ActiveStreamView {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self {
            streams: StreamSeaOrmRepository::new(connection),
        }
    }

    /// Public-safe listing; only whitelisted projection fields appear.
    pub async fn list(&self) -> AppResult<Vec<ActiveStreamEntry>> {
        self.streams.find_active().await
    }
}

/// Finished-broadcast history.
#[derive(Clone)]
pub struct HistoryView {
    streams: StreamSeaOrmRepository,
}

impl HistoryView {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self {
            streams: StreamSeaOrmRepository::new(connection),
        }
    }

    /// Finished streams for one user, newest first.
    pub async fn for_user(&self, user_id: Uuid) -> AppResult<Vec<FinishedStreamEntry>> {
        self.streams.find_finished_for_users(&[user_id]).await
    }

    /// Distinct users with at least one recorded broadcast.
    pub async fn broadcasting_users(&self, limit: u64) -> AppResult<Vec<Uuid>> {
        self.streams.find_distinct_broadcasting_users(limit).await
    }
}
