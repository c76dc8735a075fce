//! Tag attachment at stream creation
//!
//! Attachment is best-effort, not transactional: inserts fan out
//! concurrently and committed rows are not rolled back when a later insert
//! fails. The batch always settles before the first failure is reported.

use futures::future::join_all;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::database::repositories::StreamTagSeaOrmRepository;
use crate::errors::AppResult;

/// Links a set of tag ids to a freshly created stream.
#[derive(Clone)]
pub struct TagAssociator {
    stream_tags: StreamTagSeaOrmRepository,
}

impl TagAssociator {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self {
            stream_tags: StreamTagSeaOrmRepository::new(connection),
        }
    }

    /// Attach `tag_ids` to the stream, returning how many were attached.
    /// Nil ids are silently skipped; an empty set is an immediate no-op.
    pub async fn attach(&self, stream_id: Uuid, tag_ids: &[Uuid]) -> AppResult<usize> {
        let wanted: Vec<Uuid> = tag_ids.iter().copied().filter(|id| !id.is_nil()).collect();
        if wanted.is_empty() {
            return Ok(0);
        }

        let inserts = wanted
            .iter()
            .map(|tag_id| self.stream_tags.create(stream_id, *tag_id));
        let results = join_all(inserts).await;

        let mut attached = 0;
        let mut first_failure = None;
        for (tag_id, result) in wanted.iter().zip(results) {
            match result {
                Ok(()) => attached += 1,
                Err(error) => {
                    warn!(%stream_id, %tag_id, %error, "failed to attach tag");
                    if first_failure.is_none() {
                        first_failure = Some(error);
                    }
                }
            }
        }

        match first_failure {
            Some(error) => Err(error),
            None => Ok(attached),
        }
    }
}
