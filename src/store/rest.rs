//! REST client for the video metadata store.

use crate::error::{Result, SubflowError};
use crate::store::{MetadataStore, VideoRecord, VideoUpdate};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

/// Client for a metadata service exposing `GET /videos/{id}` and
/// `PUT /videos/{id}`. Updates carry the expected version; the service
/// answers 409 when the record has moved on.
pub struct RestMetadataStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestMetadataStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn video_url(&self, video_id: &str) -> String {
        format!("{}/videos/{}", self.base_url.trim_end_matches('/'), video_id)
    }
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    #[serde(flatten)]
    update: &'a VideoUpdate,
    expected_version: u64,
}

#[async_trait]
impl MetadataStore for RestMetadataStore {
    async fn get(&self, video_id: &str) -> Result<VideoRecord> {
        let response = self.client.get(self.video_url(video_id)).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SubflowError::ArtifactNotFound(format!(
                "video record {}",
                video_id
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubflowError::Api(format!(
                "Metadata get failed ({}): {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn update(
        &self,
        video_id: &str,
        update: VideoUpdate,
        expected_version: u64,
    ) -> Result<()> {
        debug!("Updating video {} at version {}", video_id, expected_version);

        let response = self
            .client
            .put(self.video_url(video_id))
            .json(&UpdateRequest {
                update: &update,
                expected_version,
            })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(SubflowError::MetadataConflict(format!(
                "video {} no longer at version {}",
                video_id, expected_version
            )));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SubflowError::ArtifactNotFound(format!(
                "video record {}",
                video_id
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubflowError::Api(format!(
                "Metadata update failed ({}): {}",
                status, body
            )));
        }

        Ok(())
    }
}
