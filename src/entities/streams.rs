use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per broadcast attempt. `broadcast_id` and `start` stay null until
/// the ingest server confirms the publisher actually went live; `end` and
/// `path` stay null until the broadcast is confirmed finished.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "streams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub stream_key: String,
    pub broadcast_id: Option<String>,
    pub title: String,
    pub preview: Option<String>,
    pub start: Option<DateTimeUtc>,
    pub end: Option<DateTimeUtc>,
    pub path: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
