use async_trait::async_trait;
use uuid::Uuid;
use sqlx::{self, PgPool, QueryBuilder};

use crate::{
    entities::project::{Project, ProjectInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str = "id, title, short_description, description, category, \
    technologies, features, image, images, live_url, github_url, duration, role, client, \
    challenges, created_at, updated_at";

/// Ordering of a full catalog read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// Newest first, as the public showcase lists them.
    CreatedDesc,
    /// Whatever order the store returns.
    Unordered,
}

/// The catalog store. Every call is a fresh round trip; nothing is cached.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list_projects(&self, order: ListOrder) -> Result<Vec<Project>, AppError>;
    /// `Ok(None)` is an ordinary miss, not an error.
    async fn find_project(&self, id: &Uuid) -> Result<Option<Project>, AppError>;
    async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError>;
    /// Replaces every field but `id` and `created_at`; last writer wins.
    async fn update_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<Project, AppError>;
    /// Returns whether a record was actually removed.
    async fn delete_project(&self, id: &Uuid) -> Result<bool, AppError>;
    async fn check_connection(&self) -> Result<(), AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn list_projects(&self, order: ListOrder) -> Result<Vec<Project>, AppError> {
        let mut builder = QueryBuilder::new(format!("SELECT {PROJECT_COLUMNS} FROM projects"));

        if order == ListOrder::CreatedDesc {
            builder.push(" ORDER BY created_at DESC");
        }

        let query = builder.build_query_as::<Project>();
        let projects: Vec<Project> = query.fetch_all(&self.pool).await?;

        Ok(projects)
    }

    async fn find_project(&self, id: &Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1")
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError> {
        // created_at and updated_at come from the column defaults
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO projects (
                title, short_description, description, category, technologies, features,
                image, images, live_url, github_url, duration, role, client, challenges
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#
        )
        .bind(&project.title)
        .bind(&project.short_description)
        .bind(&project.description)
        .bind(&project.category)
        .bind(&project.technologies)
        .bind(&project.features)
        .bind(&project.image)
        .bind(&project.images)
        .bind(&project.live_url)
        .bind(&project.github_url)
        .bind(&project.duration)
        .bind(&project.role)
        .bind(&project.client)
        .bind(&project.challenges)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<Project, AppError> {
        // created_at is never part of the SET list
        let updated = sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects SET
                title = $1,
                short_description = $2,
                description = $3,
                category = $4,
                technologies = $5,
                features = $6,
                image = $7,
                images = $8,
                live_url = $9,
                github_url = $10,
                duration = $11,
                role = $12,
                client = $13,
                challenges = $14,
                updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $15
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&project.title)
        .bind(&project.short_description)
        .bind(&project.description)
        .bind(&project.category)
        .bind(&project.technologies)
        .bind(&project.features)
        .bind(&project.image)
        .bind(&project.images)
        .bind(&project.live_url)
        .bind(&project.github_url)
        .bind(&project.duration)
        .bind(&project.role)
        .bind(&project.client)
        .bind(&project.challenges)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn delete_project(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
