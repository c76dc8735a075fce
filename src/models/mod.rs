//! Domain models for streams and their read projections

use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::streams;

/// Lifecycle state of a stream record, derived from its timestamps.
///
/// `Pending` means created but never gone live, `Active` means currently
/// broadcasting, `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    Pending,
    Active,
    Finished,
}

/// Full stream record as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stream_key: String,
    pub broadcast_id: Option<String>,
    pub title: String,
    pub preview: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stream {
    pub fn state(&self) -> StreamState {
        match (self.start, self.end) {
            (_, Some(_)) => StreamState::Finished,
            (Some(_), None) => StreamState::Active,
            (None, None) => StreamState::Pending,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }
}

impl From<streams::Model> for Stream {
    fn from(model: streams::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            stream_key: model.stream_key,
            broadcast_id: model.broadcast_id,
            title: model.title,
            preview: model.preview,
            start: model.start,
            end: model.end,
            path: model.path,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Fields required to create a pending stream.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamCreateRequest {
    pub user_id: Uuid,
    pub stream_key: String,
    pub title: String,
    pub preview: Option<String>,
}

/// Public listing projection for active streams.
///
/// Deliberately narrower than [`Stream`]: it carries only the whitelisted
/// fields, so the owner's private fields cannot reach a public listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ActiveStreamEntry {
    pub id: Uuid,
    pub broadcast_id: Option<String>,
    pub title: String,
    pub start: Option<DateTime<Utc>>,
    pub stream_key: String,
    pub preview: Option<String>,
}

/// History listing projection for finished streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct FinishedStreamEntry {
    pub id: Uuid,
    pub broadcast_id: Option<String>,
    pub title: String,
    pub start: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub user_id: Uuid,
    pub preview: Option<String>,
}
