//! SeaORM-based StreamTag repository
//!
//! Insert-only join rows; deletion happens by cascading stream deletion,
//! which lives outside this service.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{prelude::StreamTags, stream_tags};
use crate::errors::AppResult;

/// SeaORM-based repository for stream/tag join rows
#[derive(Clone)]
pub struct StreamTagSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl StreamTagSeaOrmRepository {
    /// Create a new repository instance
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn create(&self, stream_id: Uuid, tag_id: Uuid) -> AppResult<()> {
        let active_model = stream_tags::ActiveModel {
            stream_id: Set(stream_id),
            tag_id: Set(tag_id),
            created_at: Set(Utc::now()),
        };
        active_model.insert(&*self.connection).await?;
        Ok(())
    }

    pub async fn find_tag_ids_for_stream(&self, stream_id: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(StreamTags::find()
            .select_only()
            .column(stream_tags::Column::TagId)
            .filter(stream_tags::Column::StreamId.eq(stream_id))
            .into_tuple::<Uuid>()
            .all(&*self.connection)
            .await?)
    }

    pub async fn count_for_stream(&self, stream_id: Uuid) -> AppResult<u64> {
        Ok(StreamTags::find()
            .filter(stream_tags::Column::StreamId.eq(stream_id))
            .count(&*self.connection)
            .await?)
    }
}
