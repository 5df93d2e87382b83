//! In-memory stores for tests and local runs.

use crate::error::{Result, SubflowError};
use crate::store::{MetadataStore, ObjectStore, VideoRecord, VideoUpdate};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().expect("lock poisoned").contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .expect("lock poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| SubflowError::ArtifactNotFound(key.to_string()))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.objects
            .lock()
            .expect("lock poisoned")
            .insert(key.to_string(), body);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMetadataStore {
    records: Mutex<HashMap<String, VideoRecord>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, as video registration would.
    pub fn insert(&self, record: VideoRecord) {
        self.records
            .lock()
            .expect("lock poisoned")
            .insert(record.video_id.clone(), record);
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get(&self, video_id: &str) -> Result<VideoRecord> {
        self.records
            .lock()
            .expect("lock poisoned")
            .get(video_id)
            .cloned()
            .ok_or_else(|| SubflowError::ArtifactNotFound(format!("video record {}", video_id)))
    }

    async fn update(
        &self,
        video_id: &str,
        update: VideoUpdate,
        expected_version: u64,
    ) -> Result<()> {
        let mut records = self.records.lock().expect("lock poisoned");
        let record = records
            .get_mut(video_id)
            .ok_or_else(|| SubflowError::ArtifactNotFound(format!("video record {}", video_id)))?;

        if record.version != expected_version {
            return Err(SubflowError::MetadataConflict(format!(
                "video {} is at version {}, update expected {}",
                video_id, record.version, expected_version
            )));
        }

        record.apply(update);
        Ok(())
    }
}
