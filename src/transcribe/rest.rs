//! REST client for the transcription service.

use crate::error::{Result, SubflowError};
use crate::transcribe::{JobStatus, TranscriptionJob, TranscriptionService};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client for a transcription service exposing `POST /jobs` and
/// `GET /jobs/{id}`.
pub struct RestTranscriptionService {
    client: reqwest::Client,
    base_url: String,
}

impl RestTranscriptionService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    media_key: &'a str,
    language_code: &'a str,
}

#[derive(Deserialize)]
struct SubmitResponse {
    job_id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    job_id: String,
    status: JobStatus,
    #[serde(default)]
    output_location: Option<String>,
    #[serde(default)]
    failure_reason: Option<String>,
}

#[async_trait]
impl TranscriptionService for RestTranscriptionService {
    async fn submit(&self, media_key: &str, language_code: &str) -> Result<String> {
        let url = format!("{}/jobs", self.base_url.trim_end_matches('/'));
        debug!("Submitting transcription job for {}", media_key);

        let response = self
            .client
            .post(&url)
            .json(&SubmitRequest {
                media_key,
                language_code,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubflowError::Api(format!(
                "Transcription submit failed ({}): {}",
                status, body
            )));
        }

        let parsed: SubmitResponse = response.json().await?;
        Ok(parsed.job_id)
    }

    async fn status(&self, job_id: &str) -> Result<TranscriptionJob> {
        let url = format!("{}/jobs/{}", self.base_url.trim_end_matches('/'), job_id);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubflowError::Api(format!(
                "Transcription status failed ({}): {}",
                status, body
            )));
        }

        let parsed: StatusResponse = response.json().await?;
        debug!("Job {} is {:?}", parsed.job_id, parsed.status);

        Ok(TranscriptionJob {
            id: parsed.job_id,
            status: parsed.status,
            output_location: parsed.output_location,
            failure_reason: parsed.failure_reason,
        })
    }
}
