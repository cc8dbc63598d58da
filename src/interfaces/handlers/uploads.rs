use actix_multipart::{Field, Multipart};
use actix_web::{
    http::header::{CacheControl, CacheDirective},
    web::{self, BytesMut},
    HttpResponse, Responder,
};
use futures_util::TryStreamExt;
use tracing::instrument;

use crate::{
    entities::upload::{UploadFile, UploadedImagesResponse},
    errors::{AdminAction, AdminActionError, AppError},
    AppState,
};

/// Accepts a multipart batch of images and answers with their public URLs,
/// in the order the parts were sent.
#[instrument(skip(state, payload))]
pub async fn upload_images(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<impl Responder, AdminActionError> {
    let upload_handler = &state.upload_handler;

    let files = read_files(payload, upload_handler.max_upload_bytes)
        .await
        .map_err(|e| AdminActionError::new(AdminAction::Upload, e))?;

    let images = upload_handler
        .upload_images(files)
        .await
        .map_err(|e| AdminActionError::new(AdminAction::Upload, e))?;

    Ok(HttpResponse::Created().json(UploadedImagesResponse {
        message: format!("{} image(s) uploaded successfully!", images.len()),
        images,
    }))
}

async fn read_files(mut payload: Multipart, max_bytes: usize) -> Result<Vec<UploadFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = payload.try_next().await? {
        let Some(file_name) = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string)
        else {
            // plain form values carry nothing to store
            continue;
        };

        let content_type = field.content_type().map(|mime| mime.to_string());
        let bytes = read_field(field, &file_name, max_bytes).await?;

        files.push(UploadFile::new(file_name, content_type, bytes));
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No files were uploaded".to_string()));
    }
    Ok(files)
}

async fn read_field(mut field: Field, file_name: &str, max_bytes: usize) -> Result<BytesMut, AppError> {
    let mut buffer = BytesMut::new();

    while let Some(chunk) = field.try_next().await? {
        if buffer.len() + chunk.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "{} exceeds {} bytes",
                file_name, max_bytes
            )));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

/// Serves a stored object by key. This is what the local blob store's public URLs point at.
#[instrument(skip(state))]
pub async fn serve_upload(
    state: web::Data<AppState>,
    key: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let object = state.upload_handler
        .blob_store
        .get_object(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No such upload: {}", key)))?;

    Ok(HttpResponse::Ok()
        .content_type(object.content_type)
        .insert_header(CacheControl(vec![CacheDirective::Public, CacheDirective::MaxAge(86_400)]))
        .body(object.bytes))
}
