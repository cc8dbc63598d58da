use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Cover image used when a project has no uploaded images.
pub const PLACEHOLDER_IMAGE: &str = "/api/placeholder/400/300";

/// Every uploaded project image lives under this key prefix.
pub const PROJECT_BLOB_PREFIX: &str = "projects/";
