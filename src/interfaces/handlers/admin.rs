use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use tracing::instrument;

use crate::{
    entities::project::{Project, ProjectForm},
    errors::{AdminAction, AdminActionError},
    AppState,
};

#[derive(Debug, Serialize)]
struct ProjectEditResponse {
    project: Project,
    form: ProjectForm,
}

#[instrument(skip(state))]
pub async fn admin_list_projects(
    state: web::Data<AppState>,
) -> Result<impl Responder, AdminActionError> {
    let projects = state.catalog_handler
        .admin_list_projects()
        .await
        .map_err(|e| AdminActionError::new(AdminAction::Load, e))?;

    Ok(HttpResponse::Ok().json(projects))
}

/// Loads a project together with the form state used to edit it.
#[instrument(skip(state))]
pub async fn admin_get_project(
    state: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<impl Responder, AdminActionError> {
    let project = state.catalog_handler
        .get_project(&project_id)
        .await
        .map_err(|e| AdminActionError::new(AdminAction::Load, e))?;

    let form = project.to_form();
    Ok(HttpResponse::Ok().json(ProjectEditResponse { project, form }))
}

#[instrument(skip(state, data))]
pub async fn create_project(
    state: web::Data<AppState>,
    data: web::Json<ProjectForm>,
) -> Result<impl Responder, AdminActionError> {
    let response = state.catalog_handler
        .create_project(data.into_inner())
        .await
        .map_err(|e| AdminActionError::new(AdminAction::Save, e))?;

    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip(state, data))]
pub async fn update_project(
    state: web::Data<AppState>,
    project_id: web::Path<String>,
    data: web::Json<ProjectForm>,
) -> Result<impl Responder, AdminActionError> {
    let project = state.catalog_handler
        .update_project(&project_id, data.into_inner())
        .await
        .map_err(|e| AdminActionError::new(AdminAction::Save, e))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Project updated successfully!",
        "project": project
    })))
}

#[instrument(skip(state))]
pub async fn delete_project(
    state: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<impl Responder, AdminActionError> {
    state.catalog_handler
        .delete_project(&project_id)
        .await
        .map_err(|e| AdminActionError::new(AdminAction::Delete, e))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Project deleted successfully!"
    })))
}

#[instrument(skip(state))]
pub async fn seed_demo_projects(
    state: web::Data<AppState>,
) -> Result<impl Responder, AdminActionError> {
    let ids = state.catalog_handler
        .seed_demo_projects()
        .await
        .map_err(|e| AdminActionError::new(AdminAction::Seed, e))?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Demo data seeded successfully!",
        "ids": ids
    })))
}
