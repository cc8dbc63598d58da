use actix_web::web::Bytes;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::Display;
use std::collections::HashSet;
use url::Url;

use crate::constants::PROJECT_BLOB_PREFIX;

pub mod local;
pub mod memory;

pub use local::LocalBlobStore;
pub use memory::InMemoryBlobStore;

/// An object held by a blob store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

/// Object bytes plus the content type they are served with.
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Hosted object storage for project images.
///
/// Implementations hand back public URLs on write and must be able to map
/// such a URL back to its key, so that unreferenced objects can be found.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put_object(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, BlobError>;
    async fn get_object(&self, key: &str) -> Result<Option<ObjectData>, BlobError>;
    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobError>;
    async fn delete_object(&self, key: &str) -> Result<(), BlobError>;
    fn public_url(&self, key: &str) -> String;
    fn key_for_url(&self, url: &str) -> Option<String>;
}

#[derive(Debug, Display)]
pub enum BlobError {
    #[display("Invalid object key: {_0}")]
    InvalidKey(String),

    #[display("Blob store IO failure: {_0}")]
    Io(std::io::Error),

    #[display("Blob store rejected the request: {_0}")]
    Rejected(String),
}

impl From<std::io::Error> for BlobError {
    fn from(err: std::io::Error) -> Self {
        BlobError::Io(err)
    }
}

/// Rejects keys that are empty, absolute, or climb out of the store root.
pub fn validate_key(key: &str) -> Result<(), BlobError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if bad {
        return Err(BlobError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Reduces a client-supplied file name to a single safe path segment.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '-' })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '-');

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Builds `projects/<millis>-<name>` keys for one upload batch, in input order.
///
/// Every key handed out is distinct within the batch: a collision gets the
/// file's position spliced in after the timestamp, and further suffixes are
/// tried until a free key turns up.
pub fn project_object_keys<'a, I>(millis: i64, file_names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut taken = HashSet::new();

    file_names
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let name = sanitize_file_name(name);
            let mut key = format!("{}{}-{}", PROJECT_BLOB_PREFIX, millis, name);
            let mut attempt = 0;
            while taken.contains(&key) {
                key = if attempt == 0 {
                    format!("{}{}-{}-{}", PROJECT_BLOB_PREFIX, millis, index, name)
                } else {
                    format!("{}{}-{}-{}-{}", PROJECT_BLOB_PREFIX, millis, index, attempt, name)
                };
                attempt += 1;
            }
            taken.insert(key.clone());
            key
        })
        .collect()
}

/// Maps a public URL back to its object key.
///
/// URLs under `base` are stripped directly. URLs written under an earlier
/// base (another host, port, or proxy) are matched on their path instead:
/// whatever follows the last occurrence of the base's path segment.
pub(crate) fn key_under_base(base: &str, url: &str) -> Option<String> {
    let base = base.trim_end_matches('/');
    let key = match url.strip_prefix(base).and_then(|rest| rest.strip_prefix('/')) {
        Some(key) => key.to_string(),
        None => key_from_path(base, url)?,
    };
    validate_key(&key).ok()?;
    Some(key)
}

fn key_from_path(base: &str, url: &str) -> Option<String> {
    let base_path = url_path(base)?;
    let url_path = url_path(url)?;

    let base_path = base_path.trim_end_matches('/');
    if base_path.is_empty() {
        return Some(url_path.trim_start_matches('/').to_string());
    }

    let marker = format!("{}/", base_path);
    let (_, key) = url_path.rsplit_once(marker.as_str())?;
    Some(key.to_string())
}

fn url_path(raw: &str) -> Option<String> {
    if raw.starts_with('/') {
        return Some(raw.split(['?', '#']).next().unwrap_or_default().to_string());
    }
    Url::parse(raw).ok().map(|parsed| parsed.path().to_string())
}
