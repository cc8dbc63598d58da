use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use portfolio_catalog::{
    background_task::start_blob_sweep_task,
    db::postgres::{create_pool, run_migrations},
    graceful_shutdown::shutdown_signal,
    repositories::{memory::InMemoryProjectRepo, project::ProjectRepository, sqlx_repo::SqlxProjectRepo},
    routes::configure_routes,
    settings::{AppConfig, BlobBackend, LogFormat, StoreBackend},
    storage::{BlobStore, InMemoryBlobStore, LocalBlobStore},
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }
    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);
    tracing::info!("Loaded configuration: {:?}", config);

    let project_repo: Arc<dyn ProjectRepository> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = create_pool(&config.database_url, config.db_max_connections)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to create database connection pool: {}", e);
                    std::io::Error::other(e)
                })?;
            run_migrations(&pool).await.map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                std::io::Error::other(e)
            })?;
            Arc::new(SqlxProjectRepo::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory catalog store; projects vanish on restart");
            Arc::new(InMemoryProjectRepo::new())
        }
    };

    let blob_store: Arc<dyn BlobStore> = match config.blob_backend {
        BlobBackend::Local => Arc::new(LocalBlobStore::new(&config.blob_root, &config.blob_public_base_url)),
        BlobBackend::Memory => Arc::new(InMemoryBlobStore::new(&config.blob_public_base_url)),
    };

    if let Some(every) = config.blob_sweep_interval() {
        tokio::spawn(start_blob_sweep_task(
            Arc::clone(&project_repo),
            Arc::clone(&blob_store),
            every,
            config.blob_orphan_grace(),
        ));
    }

    let app_state = web::Data::new(AppState::new(&config, project_repo, blob_store));

    let server_addr = format!("{}:{}", config.host, config.port);
    let cors_origins = config.cors_origins();

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(build_cors(&cors_origins))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
