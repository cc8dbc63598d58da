use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{catalog, entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{db, storage, utils};

use repositories::project::ProjectRepository;
use storage::BlobStore;
use use_cases::{catalog::CatalogHandler, uploads::UploadHandler};

#[derive(Clone)]
pub struct AppState {
    pub catalog_handler: CatalogHandler,
    pub upload_handler: UploadHandler,
}

impl AppState {
    pub fn new(
        config: &settings::AppConfig,
        project_repo: Arc<dyn ProjectRepository>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Self {
        AppState {
            catalog_handler: CatalogHandler::new(project_repo),
            upload_handler: UploadHandler::new(blob_store, config.max_upload_bytes),
        }
    }
}
