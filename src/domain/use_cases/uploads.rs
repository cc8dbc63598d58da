use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;

use crate::{
    entities::upload::UploadFile,
    errors::AppError,
    storage::{project_object_keys, BlobStore},
};

#[derive(Clone)]
pub struct UploadHandler {
    pub blob_store: Arc<dyn BlobStore>,
    pub max_upload_bytes: usize,
}

impl UploadHandler {
    pub fn new(blob_store: Arc<dyn BlobStore>, max_upload_bytes: usize) -> Self {
        UploadHandler { blob_store, max_upload_bytes }
    }

    /// Uploads every file concurrently and returns their public URLs in the
    /// order the files were given. One failure fails the whole batch.
    pub async fn upload_images(&self, files: Vec<UploadFile>) -> Result<Vec<String>, AppError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let content_types = files
            .iter()
            .map(|file| self.check_image(file))
            .collect::<Result<Vec<_>, _>>()?;

        let keys = project_object_keys(
            Utc::now().timestamp_millis(),
            files.iter().map(|file| file.file_name.as_str()),
        );

        let uploads = files
            .into_iter()
            .zip(keys)
            .zip(content_types)
            .map(|((file, key), content_type)| {
                let store = Arc::clone(&self.blob_store);
                async move {
                    store
                        .put_object(&key, file.bytes, &content_type)
                        .await
                        .map_err(AppError::from)
                }
            });

        let urls = try_join_all(uploads).await?;
        tracing::info!(count = urls.len(), "Uploaded project images");

        Ok(urls)
    }

    /// Returns the detected MIME type, refusing empty, oversized, or non-image files.
    fn check_image(&self, file: &UploadFile) -> Result<String, AppError> {
        if file.bytes.is_empty() {
            return Err(AppError::BadRequest(format!("{} is empty", file.file_name)));
        }
        if file.bytes.len() > self.max_upload_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "{} exceeds {} bytes",
                file.file_name, self.max_upload_bytes
            )));
        }

        match infer::get(&file.bytes) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(kind.mime_type().to_string()),
            Some(kind) => Err(AppError::UnsupportedMediaType(format!(
                "{} is {}, not an image",
                file.file_name,
                kind.mime_type()
            ))),
            None => Err(AppError::UnsupportedMediaType(format!(
                "{} ({}) is not a recognised image",
                file.file_name,
                file.content_type.as_deref().unwrap_or("unknown type")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::project::ProjectForm,
        storage::{BlobError, InMemoryBlobStore, ObjectData, StoredObject},
    };
    use actix_web::web::Bytes;
    use async_trait::async_trait;
    use mockall::mock;
    use std::time::Duration;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    mock! {
        pub Blobs {}

        #[async_trait]
        impl BlobStore for Blobs {
            async fn put_object(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, BlobError>;
            async fn get_object(&self, key: &str) -> Result<Option<ObjectData>, BlobError>;
            async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobError>;
            async fn delete_object(&self, key: &str) -> Result<(), BlobError>;
            fn public_url(&self, key: &str) -> String;
            fn key_for_url(&self, url: &str) -> Option<String>;
        }
    }

    fn png(name: &str) -> UploadFile {
        UploadFile::new(name, Some("image/png".into()), Bytes::from_static(PNG))
    }

    /// Records completion order; the first key written is held back so it lands last.
    struct SlowFirstStore {
        inner: InMemoryBlobStore,
        finished: parking_lot::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BlobStore for SlowFirstStore {
        async fn put_object(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, BlobError> {
            if key.ends_with("-first.png") {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            let url = self.inner.put_object(key, bytes, content_type).await?;
            self.finished.lock().push(key.to_string());
            Ok(url)
        }
        async fn get_object(&self, key: &str) -> Result<Option<ObjectData>, BlobError> {
            self.inner.get_object(key).await
        }
        async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobError> {
            self.inner.list_objects(prefix).await
        }
        async fn delete_object(&self, key: &str) -> Result<(), BlobError> {
            self.inner.delete_object(key).await
        }
        fn public_url(&self, key: &str) -> String {
            self.inner.public_url(key)
        }
        fn key_for_url(&self, url: &str) -> Option<String> {
            self.inner.key_for_url(url)
        }
    }

    #[tokio::test]
    async fn urls_come_back_in_selection_order() {
        let store = Arc::new(SlowFirstStore {
            inner: InMemoryBlobStore::new("https://cdn.test"),
            finished: parking_lot::Mutex::new(Vec::new()),
        });
        let handler = UploadHandler::new(store.clone(), 1024);

        let urls = handler
            .upload_images(vec![png("first.png"), png("second.png"), png("third.png")])
            .await
            .unwrap();

        let finished = store.finished.lock().clone();
        assert!(finished.last().unwrap().ends_with("-first.png"));

        assert_eq!(urls.len(), 3);
        assert!(urls[0].ends_with("-first.png"));
        assert!(urls[1].ends_with("-second.png"));
        assert!(urls[2].ends_with("-third.png"));
        assert!(urls.iter().all(|url| url.starts_with("https://cdn.test/projects/")));
    }

    #[tokio::test]
    async fn one_failed_upload_leaves_form_images_untouched() {
        let mut blobs = MockBlobs::new();
        blobs.expect_put_object().returning(|key, _, _| {
            if key.ends_with("broken.png") {
                Err(BlobError::Rejected("quota exceeded".into()))
            } else {
                Ok(format!("https://cdn.test/{key}"))
            }
        });
        let handler = UploadHandler::new(Arc::new(blobs), 1024);

        let mut form = ProjectForm {
            images: vec!["https://cdn.test/projects/existing.png".into()],
            ..ProjectForm::default()
        };
        let before = form.images.clone();

        match handler.upload_images(vec![png("a.png"), png("broken.png"), png("c.png")]).await {
            Ok(urls) => form.append_images(urls),
            Err(e) => assert!(matches!(e, AppError::StorageError(_))),
        }

        assert_eq!(form.images, before);
    }

    #[tokio::test]
    async fn successful_batch_is_appended_after_existing_images() {
        let store = InMemoryBlobStore::new("https://cdn.test");
        let handler = UploadHandler::new(Arc::new(store.clone()), 1024);
        let mut form = ProjectForm {
            images: vec!["https://cdn.test/projects/existing.png".into()],
            ..ProjectForm::default()
        };

        let urls = handler.upload_images(vec![png("new.png")]).await.unwrap();
        form.append_images(urls);

        assert_eq!(form.images.len(), 2);
        assert_eq!(form.images[0], "https://cdn.test/projects/existing.png");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn non_images_reject_the_whole_batch_before_any_upload() {
        let mut blobs = MockBlobs::new();
        blobs.expect_put_object().never();
        let handler = UploadHandler::new(Arc::new(blobs), 1024);

        let notes = UploadFile::new("notes.txt", Some("text/plain".into()), Bytes::from_static(b"hello"));
        let result = handler.upload_images(vec![png("ok.png"), notes]).await;

        assert!(matches!(result, Err(AppError::UnsupportedMediaType(_))));
    }

    #[tokio::test]
    async fn oversized_files_are_refused() {
        let handler = UploadHandler::new(Arc::new(InMemoryBlobStore::new("https://cdn.test")), 4);
        let result = handler.upload_images(vec![png("big.png")]).await;
        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
    }
}
