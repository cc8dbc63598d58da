use std::{io, path::PathBuf};

use actix_web::web::Bytes;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;

use super::{key_under_base, validate_key, BlobError, BlobStore, ObjectData, StoredObject};

/// Filesystem-backed blob store. Objects are served back by the
/// `/uploads/{key}` route, which is what `public_base_url` points at.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        LocalBlobStore {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put_object(&self, key: &str, bytes: Bytes, _content_type: &str) -> Result<String, BlobError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &bytes).await?;

        tracing::debug!(key, size = bytes.len(), "Stored object");
        Ok(self.public_url(key))
    }

    async fn get_object(&self, key: &str) -> Result<Option<ObjectData>, BlobError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(data) => {
                let content_type = infer::get(&data)
                    .map(|kind| kind.mime_type().to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                Ok(Some(ObjectData { bytes: Bytes::from(data), content_type }))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobError> {
        let (dir_part, name_prefix) = match prefix.rsplit_once('/') {
            Some((dir, rest)) => (dir, rest),
            None => ("", prefix),
        };
        let dir = if dir_part.is_empty() { self.root.clone() } else { self.path_for(dir_part)? };

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if !name.starts_with(name_prefix) {
                continue;
            }

            let key = if dir_part.is_empty() { name } else { format!("{}/{}", dir_part, name) };
            let modified_at = metadata.modified().map(DateTime::<Utc>::from).unwrap_or_else(|_| Utc::now());
            objects.push(StoredObject { key, size: metadata.len(), modified_at });
        }

        Ok(objects)
    }

    async fn delete_object(&self, key: &str) -> Result<(), BlobError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        key_under_base(&self.public_base_url, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store() -> (LocalBlobStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("portfolio-blobs-{}", uuid::Uuid::new_v4()));
        (LocalBlobStore::new(&root, "http://localhost:8080/uploads/"), root)
    }

    #[tokio::test]
    async fn put_then_get_round_trips_bytes() {
        let (store, root) = scratch_store();

        let url = store
            .put_object("projects/1-a.png", Bytes::from_static(b"\x89PNG\r\n\x1a\nrest"), "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8080/uploads/projects/1-a.png");
        let object = store.get_object("projects/1-a.png").await.unwrap().unwrap();
        assert_eq!(object.content_type, "image/png");

        let listed = store.list_objects("projects/").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].key, "projects/1-a.png");

        store.delete_object("projects/1-a.png").await.unwrap();
        assert!(store.get_object("projects/1-a.png").await.unwrap().is_none());

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn listing_a_missing_prefix_is_empty() {
        let (store, _root) = scratch_store();
        assert!(store.list_objects("projects/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn traversal_keys_are_refused() {
        let (store, _root) = scratch_store();
        let result = store.put_object("../escape.png", Bytes::new(), "image/png").await;
        assert!(matches!(result, Err(BlobError::InvalidKey(_))));
    }
}
