//! Ingest-server liveness probe
//!
//! The reconciliation sweep's only contact point with the media server. A
//! probe answers one question per stream: is the broadcast session still
//! genuinely live, or is it dead and, if dead, where does its recording
//! artifact live? The sweep only closes sessions the probe reports dead.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::models::Stream;

/// What the ingest server knows about one broadcast session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The ingest server still reports the session as publishing.
    Live,
    /// The session is gone; `path` is where its recording artifact lives.
    Ended { path: String },
}

/// Seam between the reconciler and the media server. Implementations must
/// bound their own latency; the sweep runs every probe to completion.
#[async_trait]
pub trait SessionProbe: Send + Sync {
    async fn probe(&self, stream: &Stream) -> AppResult<ProbeOutcome>;
}

/// Probe backed by the ingest server's session API and its recording
/// directory layout (`<recordings_dir>/<stream_key>/<broadcast_id>.mp4`).
pub struct IngestProbe {
    client: reqwest::Client,
    api_base: String,
    recordings_dir: PathBuf,
}

impl IngestProbe {
    pub fn new(
        api_base: impl Into<String>,
        recordings_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ingest(format!("failed to build probe client: {e}")))?;

        let api_base = api_base.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            api_base,
            recordings_dir: recordings_dir.into(),
        })
    }

    fn artifact_path(&self, stream: &Stream, broadcast_id: &str) -> String {
        self.recordings_dir
            .join(&stream.stream_key)
            .join(format!("{broadcast_id}.mp4"))
            .display()
            .to_string()
    }
}

#[async_trait]
impl SessionProbe for IngestProbe {
    async fn probe(&self, stream: &Stream) -> AppResult<ProbeOutcome> {
        let broadcast_id = stream.broadcast_id.as_deref().ok_or_else(|| {
            AppError::ingest(format!("stream {} has no broadcast id to probe", stream.id))
        })?;

        let url = format!("{}/api/v1/sessions/{}", self.api_base, broadcast_id);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(ProbeOutcome::Live),
            Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                let path = self.artifact_path(stream, broadcast_id);
                if !std::path::Path::new(&path).exists() {
                    // The recorder finalizes asynchronously; the conventional
                    // path is still the right answer.
                    debug!(broadcast_id, %path, "recording artifact not on disk yet");
                }
                Ok(ProbeOutcome::Ended { path })
            }
            Ok(response) => Err(AppError::ingest(format!(
                "session API returned {} for broadcast {broadcast_id}",
                response.status()
            ))),
            // Connection refused means no ingest server holds the session.
            Err(error) if error.is_connect() => Ok(ProbeOutcome::Ended {
                path: self.artifact_path(stream, broadcast_id),
            }),
            Err(error) => Err(AppError::ingest(format!(
                "probe request failed for broadcast {broadcast_id}: {error}"
            ))),
        }
    }
}
