//! Read-modify-write merge of a video's per-language asset records.

use crate::error::{Result, SubflowError};
use crate::store::{LanguageAsset, MetadataStore, VideoUpdate};
use tracing::{debug, warn};

/// A stale conditional write means another workflow touched the record
/// between our read and write; re-reading and re-applying is safe because
/// the merge only ever replaces its own language's entry.
const MAX_MERGE_ATTEMPTS: u32 = 3;

/// Record subtitle/caption locations for one language on a video.
///
/// Replaces the existing entry for the asset's language, or appends a new
/// one, and writes the full list back together with any extra top-level
/// fields. Repeated calls for the same `(video_id, language)` overwrite only
/// that entry, so the merge is idempotent per language.
pub async fn upsert_language_asset(
    store: &dyn MetadataStore,
    video_id: &str,
    asset: LanguageAsset,
    extra: VideoUpdate,
) -> Result<()> {
    let mut attempt = 0;

    loop {
        let record = store.get(video_id).await?;

        let mut languages = record.languages;
        match languages.iter_mut().find(|a| a.language == asset.language) {
            Some(existing) => *existing = asset.clone(),
            None => languages.push(asset.clone()),
        }

        let update = VideoUpdate {
            languages: Some(languages),
            ..extra.clone()
        };

        match store.update(video_id, update, record.version).await {
            Ok(()) => {
                debug!(
                    "Recorded {} asset for video {} (was version {})",
                    asset.language, video_id, record.version
                );
                return Ok(());
            }
            Err(SubflowError::MetadataConflict(reason)) => {
                attempt += 1;
                if attempt >= MAX_MERGE_ATTEMPTS {
                    return Err(SubflowError::MetadataConflict(reason));
                }
                warn!(
                    "Version conflict updating video {} (attempt {}), retrying",
                    video_id, attempt
                );
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryMetadataStore;
    use crate::store::{MetadataStore, VideoRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn asset(language: &str, suffix: &str) -> LanguageAsset {
        LanguageAsset {
            language: language.to_string(),
            subtitle_url: format!("https://cdn/{}{}.srt", language, suffix),
            caption_url: format!("https://cdn/{}{}.vtt", language, suffix),
        }
    }

    fn seeded_store() -> MemoryMetadataStore {
        let store = MemoryMetadataStore::new();
        store.insert(VideoRecord {
            video_id: "v1".to_string(),
            ..Default::default()
        });
        store
    }

    #[tokio::test]
    async fn test_appends_new_language() {
        let store = seeded_store();

        upsert_language_asset(&store, "v1", asset("en", ""), VideoUpdate::default())
            .await
            .unwrap();

        let record = store.get("v1").await.unwrap();
        assert_eq!(record.languages.len(), 1);
        assert_eq!(record.languages[0].language, "en");
    }

    #[tokio::test]
    async fn test_repeat_upsert_replaces_in_place() {
        let store = seeded_store();

        upsert_language_asset(&store, "v1", asset("en", "_old"), VideoUpdate::default())
            .await
            .unwrap();
        upsert_language_asset(&store, "v1", asset("en", "_new"), VideoUpdate::default())
            .await
            .unwrap();

        let record = store.get("v1").await.unwrap();
        assert_eq!(record.languages.len(), 1);
        assert!(record.languages[0].subtitle_url.contains("_new"));
    }

    #[tokio::test]
    async fn test_multiple_languages_coexist() {
        let store = seeded_store();

        upsert_language_asset(&store, "v1", asset("en", ""), VideoUpdate::default())
            .await
            .unwrap();
        upsert_language_asset(&store, "v1", asset("fr", ""), VideoUpdate::default())
            .await
            .unwrap();

        let record = store.get("v1").await.unwrap();
        let mut languages: Vec<&str> =
            record.languages.iter().map(|a| a.language.as_str()).collect();
        languages.sort_unstable();
        assert_eq!(languages, ["en", "fr"]);
    }

    #[tokio::test]
    async fn test_extra_fields_written_with_merge() {
        let store = seeded_store();

        upsert_language_asset(
            &store,
            "v1",
            asset("en", ""),
            VideoUpdate {
                has_transcript: Some(true),
                source_transcript_url: Some("https://cdn/t.txt".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let record = store.get("v1").await.unwrap();
        assert!(record.has_transcript);
        assert_eq!(
            record.source_transcript_url.as_deref(),
            Some("https://cdn/t.txt")
        );
    }

    /// Store whose first `conflicts` conditional writes fail, as if a
    /// concurrent workflow bumped the version in between.
    struct ConflictingStore {
        inner: MemoryMetadataStore,
        conflicts: AtomicU32,
    }

    #[async_trait]
    impl MetadataStore for ConflictingStore {
        async fn get(&self, video_id: &str) -> Result<VideoRecord> {
            self.inner.get(video_id).await
        }

        async fn update(
            &self,
            video_id: &str,
            update: VideoUpdate,
            expected_version: u64,
        ) -> Result<()> {
            if self.conflicts.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
                c.checked_sub(1)
            }).is_ok()
            {
                return Err(SubflowError::MetadataConflict("stale version".to_string()));
            }
            self.inner.update(video_id, update, expected_version).await
        }
    }

    #[tokio::test]
    async fn test_retries_through_conflicts() {
        let store = ConflictingStore {
            inner: seeded_store(),
            conflicts: AtomicU32::new(2),
        };

        upsert_language_asset(&store, "v1", asset("en", ""), VideoUpdate::default())
            .await
            .unwrap();

        let record = store.get("v1").await.unwrap();
        assert_eq!(record.languages.len(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_repeated_conflicts() {
        let store = ConflictingStore {
            inner: seeded_store(),
            conflicts: AtomicU32::new(u32::MAX),
        };

        let err = upsert_language_asset(&store, "v1", asset("en", ""), VideoUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SubflowError::MetadataConflict(_)));
    }
}
