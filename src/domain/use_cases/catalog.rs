use std::sync::Arc;

use uuid::Uuid;

use crate::{
    catalog::{
        detail::{DetailOutcome, DetailView},
        listing::{CategoryFilter, ListingView, ViewMode},
    },
    entities::{
        demo::demo_seed_inserts,
        project::{Project, ProjectCreatedResponse, ProjectForm, ProjectInsert},
    },
    errors::AppError,
    repositories::project::{ListOrder, ProjectRepository},
    utils::valid_uuid::valid_uuid,
};

#[derive(Clone)]
pub struct CatalogHandler {
    pub project_repo: Arc<dyn ProjectRepository>,
}

impl CatalogHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepository>) -> Self {
        CatalogHandler { project_repo }
    }

    /// Fetches every project, newest first. Store errors propagate.
    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.project_repo.list_projects(ListOrder::CreatedDesc).await
    }

    /// Fetches every project the way the admin page does, in store order.
    pub async fn admin_list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.project_repo.list_projects(ListOrder::Unordered).await
    }

    /// Builds the showcase state. Never fails: an unreachable store yields the demo set.
    pub async fn load_listing(&self, filter: CategoryFilter, view_mode: ViewMode) -> ListingView {
        let mut view = ListingView::new();
        let ticket = view.begin_fetch();
        let result = self.list_projects().await;
        view.apply_fetch(ticket, result);

        view.select_filter(filter);
        view.set_view_mode(view_mode);
        view
    }

    /// Looks a project up, keeping "no such project" apart from "store unreachable".
    /// Identifiers that are not well-formed cannot name a record, so they are misses.
    pub async fn lookup_project(&self, id: &str) -> DetailOutcome {
        let Ok(valid_id) = Uuid::parse_str(id.trim()) else {
            return DetailOutcome::NotFound;
        };

        match self.project_repo.find_project(&valid_id).await {
            Ok(Some(project)) => DetailOutcome::Found(project),
            Ok(None) => DetailOutcome::NotFound,
            Err(e) => DetailOutcome::Unavailable(e),
        }
    }

    pub async fn load_detail(&self, id: &str) -> DetailView {
        let mut view = DetailView::new();
        let ticket = view.begin_fetch();
        let outcome = self.lookup_project(id).await;
        view.apply_fetch(ticket, outcome);
        view
    }

    /// Retrieves a project for editing; a miss is an error here.
    pub async fn get_project(&self, id: &str) -> Result<Project, AppError> {
        let valid_id = valid_uuid(id)?;
        self.project_repo
            .find_project(&valid_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }

    /// Creates a project from the raw admin form.
    pub async fn create_project(&self, form: ProjectForm) -> Result<ProjectCreatedResponse, AppError> {
        let insert = ProjectInsert::try_from(form)?;

        let id = self.project_repo.create_project(&insert).await?;
        tracing::info!(%id, title = %insert.title, "Project created");

        Ok(ProjectCreatedResponse {
            id,
            message: "Project added successfully!".to_string(),
            detail_url: format!("/project/{}", id),
        })
    }

    /// Rewrites a project from the raw admin form, keeping its id and creation time.
    pub async fn update_project(&self, id: &str, form: ProjectForm) -> Result<Project, AppError> {
        let valid_id = valid_uuid(id)?;
        let insert = ProjectInsert::try_from(form)?;

        let project = self.project_repo.update_project(&valid_id, &insert).await?;
        tracing::info!(id = %valid_id, "Project updated");

        Ok(project)
    }

    /// Deletes a project. Deleting one that is already gone succeeds.
    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        let valid_id = valid_uuid(id)?;

        if self.project_repo.delete_project(&valid_id).await? {
            tracing::info!(id = %valid_id, "Project deleted");
        } else {
            tracing::debug!(id = %valid_id, "Delete of missing project ignored");
        }
        Ok(())
    }

    /// Writes the three sample projects, one after another.
    pub async fn seed_demo_projects(&self) -> Result<Vec<Uuid>, AppError> {
        let mut ids = Vec::new();
        for insert in demo_seed_inserts() {
            ids.push(self.project_repo.create_project(&insert).await?);
        }
        tracing::info!(count = ids.len(), "Seeded demo projects");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::listing::ProjectSource,
        entities::demo::demo_project,
        repositories::memory::InMemoryProjectRepo,
    };
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub ProjectRepo {}

        #[async_trait]
        impl ProjectRepository for ProjectRepo {
            async fn list_projects(&self, order: ListOrder) -> Result<Vec<Project>, AppError>;
            async fn find_project(&self, id: &Uuid) -> Result<Option<Project>, AppError>;
            async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError>;
            async fn update_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<Project, AppError>;
            async fn delete_project(&self, id: &Uuid) -> Result<bool, AppError>;
            async fn check_connection(&self) -> Result<(), AppError>;
        }
    }

    fn offline_repo() -> MockProjectRepo {
        let mut repo = MockProjectRepo::new();
        repo.expect_list_projects()
            .returning(|_| Err(AppError::StoreUnavailable("connection refused".into())));
        repo.expect_find_project()
            .returning(|_| Err(AppError::StoreUnavailable("connection refused".into())));
        repo
    }

    fn form(technologies: &str, features: &str) -> ProjectForm {
        ProjectForm {
            title: "Storefront".into(),
            short_description: "Shop".into(),
            description: "A shop.".into(),
            category: "Web Development".into(),
            technologies: technologies.into(),
            features: features.into(),
            ..ProjectForm::default()
        }
    }

    #[tokio::test]
    async fn create_then_lookup_returns_split_lists() {
        let handler = CatalogHandler::new(Arc::new(InMemoryProjectRepo::new()));

        let created = handler.create_project(form("React, Node.js", "Fast\nSecure\n")).await.unwrap();
        let project = handler.get_project(&created.id.to_string()).await.unwrap();

        assert_eq!(project.technologies, vec!["React", "Node.js"]);
        assert_eq!(project.features, vec!["Fast", "Secure"]);
        assert_eq!(created.message, "Project added successfully!");
    }

    #[tokio::test]
    async fn update_preserves_created_at() {
        let handler = CatalogHandler::new(Arc::new(InMemoryProjectRepo::new()));
        let created = handler.create_project(form("Rust", "")).await.unwrap();
        let id = created.id.to_string();
        let before = handler.get_project(&id).await.unwrap();

        let after = handler.update_project(&id, before.to_form()).await.unwrap();

        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn malformed_identifier_is_a_miss() {
        let handler = CatalogHandler::new(Arc::new(InMemoryProjectRepo::new()));
        assert!(matches!(handler.lookup_project("nonexistent-id").await, DetailOutcome::NotFound));
    }

    #[tokio::test]
    async fn outage_is_kept_apart_from_a_miss() {
        let handler = CatalogHandler::new(Arc::new(offline_repo()));
        let outcome = handler.lookup_project(&Uuid::new_v4().to_string()).await;
        assert!(matches!(outcome, DetailOutcome::Unavailable(_)));
    }

    #[tokio::test]
    async fn missing_record_and_outage_render_the_same_demo() {
        let healthy = CatalogHandler::new(Arc::new(InMemoryProjectRepo::new()));
        let offline = CatalogHandler::new(Arc::new(offline_repo()));

        let missing = healthy.load_detail("nonexistent-id").await;
        let outage = offline.load_detail("nonexistent-id").await;

        assert_eq!(missing.project(), Some(&demo_project()));
        assert_eq!(missing.project(), outage.project());
    }

    #[tokio::test]
    async fn listing_falls_back_to_demo_when_store_is_down() {
        let handler = CatalogHandler::new(Arc::new(offline_repo()));

        let view = handler.load_listing(CategoryFilter::All, ViewMode::Grid).await;

        assert_eq!(view.source(), ProjectSource::Demo);
        assert_eq!(view.visible().len(), 3);
    }

    #[tokio::test]
    async fn list_propagates_store_errors() {
        let handler = CatalogHandler::new(Arc::new(offline_repo()));
        assert!(matches!(handler.list_projects().await, Err(AppError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_store() {
        let mut repo = MockProjectRepo::new();
        repo.expect_create_project().never();
        let handler = CatalogHandler::new(Arc::new(repo));

        let result = handler.create_project(ProjectForm::default()).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn deleting_twice_is_not_an_error() {
        let handler = CatalogHandler::new(Arc::new(InMemoryProjectRepo::new()));
        let created = handler.create_project(form("Rust", "")).await.unwrap();
        let id = created.id.to_string();

        handler.delete_project(&id).await.unwrap();
        handler.delete_project(&id).await.unwrap();
        assert!(matches!(handler.get_project(&id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn seeding_writes_three_projects() {
        let repo = InMemoryProjectRepo::new();
        let handler = CatalogHandler::new(Arc::new(repo.clone()));

        let ids = handler.seed_demo_projects().await.unwrap();

        assert_eq!(ids.len(), 3);
        assert_eq!(repo.len(), 3);
    }
}
