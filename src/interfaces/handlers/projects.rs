use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    catalog::{CategoryFilter, ViewMode},
    errors::AppError,
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub view: Option<String>,
}

/// Public showcase. Falls back to the demo set when the catalog is unreachable,
/// so the only failure is a malformed `view` parameter.
#[instrument(skip(state, query))]
pub async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<ListingQuery>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();

    let view_mode = match query.view.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw.parse::<ViewMode>()?,
        _ => ViewMode::default(),
    };
    let filter = CategoryFilter::parse(query.category.as_deref());

    let listing = state.catalog_handler.load_listing(filter, view_mode).await;

    Ok(HttpResponse::Ok().json(listing.to_response()))
}

/// Public project page. Never 404s: a miss and an outage both render the demo project.
#[instrument(skip(state))]
pub async fn get_project_detail(
    state: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let detail = state.catalog_handler.load_detail(&project_id).await;

    Ok(HttpResponse::Ok().json(detail.into_response()))
}
