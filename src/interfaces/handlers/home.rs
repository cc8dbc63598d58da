use actix_web::{get, HttpResponse, Responder};
use std::env;

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the Portfolio Catalog API!",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "projects": "/api/v1/projects",
        "admin": "/api/v1/admin/projects"
    }))
}
