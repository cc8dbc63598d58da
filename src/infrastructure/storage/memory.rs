use actix_web::web::Bytes;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use super::{key_under_base, validate_key, BlobError, BlobStore, ObjectData, StoredObject};

#[derive(Debug, Clone)]
struct MemoryObject {
    data: ObjectData,
    modified_at: chrono::DateTime<Utc>,
}

/// Blob store kept in process memory. Handy for development and tests.
#[derive(Debug, Clone)]
pub struct InMemoryBlobStore {
    objects: Arc<DashMap<String, MemoryObject>>,
    public_base_url: String,
}

impl InMemoryBlobStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        InMemoryBlobStore {
            objects: Arc::new(DashMap::new()),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Moves an object's modification time, so age-based sweeps can be exercised.
    pub fn backdate(&self, key: &str, by: chrono::Duration) {
        if let Some(mut object) = self.objects.get_mut(key) {
            object.modified_at -= by;
        }
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put_object(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, BlobError> {
        validate_key(key)?;
        self.objects.insert(key.to_string(), MemoryObject {
            data: ObjectData { bytes, content_type: content_type.to_string() },
            modified_at: Utc::now(),
        });
        Ok(self.public_url(key))
    }

    async fn get_object(&self, key: &str) -> Result<Option<ObjectData>, BlobError> {
        validate_key(key)?;
        Ok(self.objects.get(key).map(|object| object.data.clone()))
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobError> {
        let mut objects: Vec<StoredObject> = self.objects
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| StoredObject {
                key: entry.key().clone(),
                size: entry.value().data.bytes.len() as u64,
                modified_at: entry.value().modified_at,
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    async fn delete_object(&self, key: &str) -> Result<(), BlobError> {
        validate_key(key)?;
        self.objects.remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        key_under_base(&self.public_base_url, url)
    }
}
