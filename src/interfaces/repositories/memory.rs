use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::{
    entities::project::{Project, ProjectInsert},
    errors::AppError,
    repositories::project::{ListOrder, ProjectRepository},
};

/// Catalog store kept in process memory. Backs the `memory` store backend
/// and stands in for the real store in tests.
#[derive(Clone, Default)]
pub struct InMemoryProjectRepo {
    projects: Arc<DashMap<Uuid, Project>>,
    clock: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl InMemoryProjectRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Server-assigned timestamps: wall clock, but strictly increasing.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.clock.lock();
        let now = Utc::now();
        let stamp = match *last {
            Some(previous) if now <= previous => previous + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(stamp);
        stamp
    }
}

fn build_project(id: Uuid, insert: &ProjectInsert, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Project {
    Project {
        id,
        title: insert.title.clone(),
        short_description: insert.short_description.clone(),
        description: insert.description.clone(),
        category: insert.category.clone(),
        technologies: insert.technologies.clone(),
        features: insert.features.clone(),
        image: insert.image.clone(),
        images: insert.images.clone(),
        live_url: insert.live_url.clone(),
        github_url: insert.github_url.clone(),
        duration: insert.duration.clone(),
        role: insert.role.clone(),
        client: insert.client.clone(),
        challenges: insert.challenges.clone(),
        created_at,
        updated_at,
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepo {
    async fn list_projects(&self, order: ListOrder) -> Result<Vec<Project>, AppError> {
        let mut projects: Vec<Project> = self.projects.iter().map(|entry| entry.value().clone()).collect();

        match order {
            ListOrder::CreatedDesc => projects.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ListOrder::Unordered => projects.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        Ok(projects)
    }

    async fn find_project(&self, id: &Uuid) -> Result<Option<Project>, AppError> {
        Ok(self.projects.get(id).map(|entry| entry.value().clone()))
    }

    async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let now = self.next_timestamp();
        self.projects.insert(id, build_project(id, project, now, now));
        Ok(id)
    }

    async fn update_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<Project, AppError> {
        let updated_at = self.next_timestamp();
        let mut entry = self.projects
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

        let updated = build_project(*id, project, entry.created_at, updated_at);
        *entry = updated.clone();
        Ok(updated)
    }

    async fn delete_project(&self, id: &Uuid) -> Result<bool, AppError> {
        Ok(self.projects.remove(id).is_some())
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::project::ProjectForm;

    fn insert(title: &str) -> ProjectInsert {
        ProjectInsert::try_from(ProjectForm {
            title: title.into(),
            short_description: "Short".into(),
            description: "Long".into(),
            category: "Web".into(),
            technologies: "Rust".into(),
            ..ProjectForm::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn update_keeps_created_at_and_advances_updated_at() {
        let repo = InMemoryProjectRepo::new();
        let id = repo.create_project(&insert("First")).await.unwrap();
        let original = repo.find_project(&id).await.unwrap().unwrap();

        let updated = repo.update_project(&id, &insert("Renamed")).await.unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at > original.updated_at);
        assert_eq!(updated.title, "Renamed");
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let repo = InMemoryProjectRepo::new();
        for title in ["one", "two", "three"] {
            repo.create_project(&insert(title)).await.unwrap();
        }

        let titles: Vec<String> = repo
            .list_projects(ListOrder::CreatedDesc)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();

        assert_eq!(titles, vec!["three", "two", "one"]);
    }

    #[tokio::test]
    async fn updating_a_missing_record_is_not_found() {
        let repo = InMemoryProjectRepo::new();
        let result = repo.update_project(&Uuid::new_v4(), &insert("Ghost")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let repo = InMemoryProjectRepo::new();
        let id = repo.create_project(&insert("Doomed")).await.unwrap();

        assert!(repo.delete_project(&id).await.unwrap());
        assert!(!repo.delete_project(&id).await.unwrap());
        assert!(repo.is_empty());
    }
}
