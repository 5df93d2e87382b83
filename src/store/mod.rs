pub mod fs;
pub mod memory;
pub mod rest;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Per-language pair of artifact locations attached to a video record.
/// A record holds at most one asset per language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageAsset {
    pub language: String,
    pub subtitle_url: String,
    pub caption_url: String,
}

/// Metadata-store entity for one registered video. `version` is the
/// conditional-write token; every successful update bumps it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    #[serde(default)]
    pub has_transcript: bool,
    #[serde(default)]
    pub source_transcript_url: Option<String>,
    #[serde(default)]
    pub languages: Vec<LanguageAsset>,
    #[serde(default)]
    pub version: u64,
}

/// Partial update applied to a video record; `None` fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<LanguageAsset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_transcript: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_transcript_url: Option<String>,
}

impl VideoRecord {
    /// Apply a partial update and bump the version.
    pub fn apply(&mut self, update: VideoUpdate) {
        if let Some(languages) = update.languages {
            self.languages = languages;
        }
        if let Some(has_transcript) = update.has_transcript {
            self.has_transcript = has_transcript;
        }
        if let Some(url) = update.source_transcript_url {
            self.source_transcript_url = Some(url);
        }
        self.version += 1;
    }
}

/// Byte storage addressed by path-like keys.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()>;
}

/// Video metadata storage with conditional writes.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn get(&self, video_id: &str) -> Result<VideoRecord>;

    /// Apply `update` only if the stored record still carries
    /// `expected_version`; otherwise fail with a conflict so the caller can
    /// re-read and retry. This is what keeps concurrent per-language merges
    /// from losing updates.
    async fn update(&self, video_id: &str, update: VideoUpdate, expected_version: u64)
        -> Result<()>;
}
