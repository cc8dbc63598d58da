use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::Utc;
use humantime::format_duration;
use tokio::time::interval;

use crate::{
    constants::PROJECT_BLOB_PREFIX,
    errors::AppError,
    repositories::project::{ListOrder, ProjectRepository},
    storage::BlobStore,
};

/// Periodically removes uploaded images that no project references.
pub async fn start_blob_sweep_task(
    project_repo: Arc<dyn ProjectRepository>,
    blob_store: Arc<dyn BlobStore>,
    every: Duration,
    grace: Duration,
) {
    tracing::info!(
        every = %format_duration(every),
        grace = %format_duration(grace),
        "Orphaned image sweep scheduled"
    );
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        match sweep_orphaned_blobs(project_repo.as_ref(), blob_store.as_ref(), grace).await {
            Ok(0) => tracing::debug!("Orphaned image sweep found nothing to remove"),
            Ok(count) => tracing::info!("Removed {} orphaned project images", count),
            Err(e) => tracing::error!("Orphaned image sweep failed: {}", e),
        }
    }
}

/// Deletes every object under the project prefix that is older than `grace`
/// and not referenced by any stored project. Returns how many were removed.
///
/// Nothing is deleted unless the catalog could be read and every stored image
/// URL could be mapped back to a key, so an outage or a foreign URL never
/// looks like "no references".
pub async fn sweep_orphaned_blobs(
    project_repo: &dyn ProjectRepository,
    blob_store: &dyn BlobStore,
    grace: Duration,
) -> Result<usize, AppError> {
    let projects = project_repo.list_projects(ListOrder::Unordered).await?;

    let mut referenced = HashSet::new();
    let mut unmapped = 0;
    for url in projects
        .iter()
        .flat_map(|project| std::iter::once(&project.image).chain(project.images.iter()))
    {
        match blob_store.key_for_url(url) {
            Some(key) => {
                referenced.insert(key);
            }
            None if url.contains(&format!("/{}", PROJECT_BLOB_PREFIX)) => unmapped += 1,
            None => {}
        }
    }

    // a stored image URL this store cannot place means references are unknown
    if unmapped > 0 {
        tracing::warn!(unmapped, "Skipping orphaned image sweep: some image URLs do not map to object keys");
        return Ok(0);
    }

    let grace = chrono::Duration::from_std(grace)
        .map_err(|e| AppError::InternalError(format!("Invalid sweep grace period: {}", e)))?;
    let cutoff = Utc::now() - grace;

    let mut removed = 0;
    for object in blob_store.list_objects(PROJECT_BLOB_PREFIX).await? {
        if object.modified_at > cutoff || referenced.contains(&object.key) {
            continue;
        }
        blob_store.delete_object(&object.key).await?;
        tracing::debug!(key = %object.key, "Deleted orphaned image");
        removed += 1;
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::project::{ProjectForm, ProjectInsert},
        repositories::memory::InMemoryProjectRepo,
        storage::{InMemoryBlobStore, LocalBlobStore},
    };
    use actix_web::web::Bytes;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
    const DAY: Duration = Duration::from_secs(60 * 60 * 24);

    async fn put(store: &InMemoryBlobStore, key: &str) -> String {
        store.put_object(key, Bytes::from_static(PNG), "image/png").await.unwrap()
    }

    fn insert_with_images(images: Vec<String>) -> ProjectInsert {
        ProjectInsert::try_from(ProjectForm {
            title: "Gallery".into(),
            short_description: "Pictures".into(),
            description: "Lots of pictures.".into(),
            category: "Design".into(),
            technologies: "Figma".into(),
            images,
            ..ProjectForm::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn only_old_unreferenced_images_are_removed() {
        let repo = InMemoryProjectRepo::new();
        let store = InMemoryBlobStore::new("https://cdn.test");

        let kept = put(&store, "projects/1-kept.png").await;
        put(&store, "projects/1-orphan.png").await;
        put(&store, "projects/2-fresh.png").await;
        put(&store, "avatars/old.png").await;
        for key in ["projects/1-kept.png", "projects/1-orphan.png", "avatars/old.png"] {
            store.backdate(key, chrono::Duration::days(2));
        }
        repo.create_project(&insert_with_images(vec![kept])).await.unwrap();

        let removed = sweep_orphaned_blobs(&repo, &store, DAY).await.unwrap();

        assert_eq!(removed, 1);
        assert!(store.get_object("projects/1-orphan.png").await.unwrap().is_none());
        assert!(store.get_object("projects/1-kept.png").await.unwrap().is_some());
        assert!(store.get_object("projects/2-fresh.png").await.unwrap().is_some());
        assert!(store.get_object("avatars/old.png").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn images_survive_a_change_of_public_base_url() {
        let root = std::env::temp_dir().join(format!("portfolio-sweep-{}", uuid::Uuid::new_v4()));
        let before = LocalBlobStore::new(&root, "http://127.0.0.1:8080/uploads");
        let after = LocalBlobStore::new(&root, "http://0.0.0.0:9090/uploads");

        let repo = InMemoryProjectRepo::new();
        let kept = before
            .put_object("projects/1-a.png", Bytes::from_static(PNG), "image/png")
            .await
            .unwrap();
        before
            .put_object("projects/1-orphan.png", Bytes::from_static(PNG), "image/png")
            .await
            .unwrap();
        repo.create_project(&insert_with_images(vec![kept])).await.unwrap();

        let removed = sweep_orphaned_blobs(&repo, &after, Duration::ZERO).await.unwrap();

        assert_eq!(removed, 1);
        assert!(after.get_object("projects/1-a.png").await.unwrap().is_some());
        assert!(after.get_object("projects/1-orphan.png").await.unwrap().is_none());

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn unmappable_image_urls_stop_the_sweep() {
        let repo = InMemoryProjectRepo::new();
        let store = InMemoryBlobStore::new("https://cdn.test/uploads");
        put(&store, "projects/1-orphan.png").await;
        store.backdate("projects/1-orphan.png", chrono::Duration::days(2));
        repo.create_project(&insert_with_images(vec!["https://old.test/media/projects/1-a.png".into()]))
            .await
            .unwrap();

        let removed = sweep_orphaned_blobs(&repo, &store, DAY).await.unwrap();

        assert_eq!(removed, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn nothing_is_removed_when_the_catalog_is_unreadable() {
        use crate::entities::project::Project;
        use async_trait::async_trait;
        use uuid::Uuid;

        struct Offline;

        #[async_trait]
        impl ProjectRepository for Offline {
            async fn list_projects(&self, _order: ListOrder) -> Result<Vec<Project>, AppError> {
                Err(AppError::StoreUnavailable("down".into()))
            }
            async fn find_project(&self, _id: &Uuid) -> Result<Option<Project>, AppError> {
                Err(AppError::StoreUnavailable("down".into()))
            }
            async fn create_project(&self, _project: &ProjectInsert) -> Result<Uuid, AppError> {
                Err(AppError::StoreUnavailable("down".into()))
            }
            async fn update_project(&self, _id: &Uuid, _project: &ProjectInsert) -> Result<Project, AppError> {
                Err(AppError::StoreUnavailable("down".into()))
            }
            async fn delete_project(&self, _id: &Uuid) -> Result<bool, AppError> {
                Err(AppError::StoreUnavailable("down".into()))
            }
            async fn check_connection(&self) -> Result<(), AppError> {
                Err(AppError::StoreUnavailable("down".into()))
            }
        }

        let store = InMemoryBlobStore::new("https://cdn.test");
        put(&store, "projects/1-orphan.png").await;
        store.backdate("projects/1-orphan.png", chrono::Duration::days(2));

        let result = sweep_orphaned_blobs(&Offline, &store, DAY).await;

        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
        assert_eq!(store.len(), 1);
    }
}
