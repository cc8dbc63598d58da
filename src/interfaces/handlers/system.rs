use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;
use std::{
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};

use crate::{constants::{START_TIME, PROJECT_BLOB_PREFIX}, AppState};

#[derive(Serialize, Clone, Default)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    catalog_store: String,
    blob_store: String,
    version: String,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> = Lazy::new(|| RwLock::new(HealthCheckResponse::default()));

async fn build_health_response(state: &web::Data<AppState>) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime.num_seconds().max(0) as u64));

    let catalog_status = match state.catalog_handler.project_repo.check_connection().await {
        Ok(_) => "OK",
        Err(e) => {
            tracing::warn!("Catalog store health check failed: {}", e);
            "Unavailable"
        }
    };

    let blob_status = match state.upload_handler.blob_store.list_objects(PROJECT_BLOB_PREFIX).await {
        Ok(_) => "OK",
        Err(e) => {
            tracing::warn!("Blob store health check failed: {}", e);
            "Unavailable"
        }
    };

    let status = if catalog_status == "OK" && blob_status == "OK" { "healthy" } else { "degraded" };

    HealthCheckResponse {
        status: status.to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        catalog_store: catalog_status.to_string(),
        blob_store: blob_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Health summary, rebuilt at most every five seconds.
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > 5 {
        let response = build_health_response(&state).await;
        *CACHED_STATUS.write() = response.clone();
        LAST_CHECK.store(now, Ordering::Relaxed);

        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::Ok().json(CACHED_STATUS.read().clone())
    }
}
