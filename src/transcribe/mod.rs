pub mod rest;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Observed status of an asynchronous transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[serde(alias = "IN_PROGRESS", alias = "QUEUED")]
    Running,
    Completed,
    Failed,
}

/// A transcription job owned by the external service; the workflow only
/// observes it.
#[derive(Debug, Clone)]
pub struct TranscriptionJob {
    pub id: String,
    pub status: JobStatus,
    pub output_location: Option<String>,
    pub failure_reason: Option<String>,
}

#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Start a job for the given media key; returns the job id.
    async fn submit(&self, media_key: &str, language_code: &str) -> Result<String>;

    /// Query a job's current status.
    async fn status(&self, job_id: &str) -> Result<TranscriptionJob>;
}
