// handlers/bootcamps/photo.rs - PUT /api/v1/bootcamps/:id/photo

use std::path::Path as FsPath;

use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use serde_json::Value;

use crate::database::schema::{bootcamp, Collection, Document};
use crate::error::ApiError;
use crate::handlers::{find_or_404, owner_of, PUBLISHERS};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// Multipart field carrying the image
const FILE_FIELD: &str = "file";

/// Upload a bootcamp photo. The file is stored as `photo_<id><ext>` and
/// the stored name is returned.
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<String> {
    user.authorize(&PUBLISHERS)?;
    let (id, existing) = find_or_404(state.store.as_ref(), Collection::Bootcamp, &id).await?;
    user.ensure_can_modify(owner_of(&existing)?, "update this bootcamp")?;

    let max = state.config.uploads.max_file_upload;
    let mut multipart = multipart.map_err(|_| ApiError::bad_request("Please upload a file"))?;

    let (data, extension) = receive_image(&mut multipart, max).await?;

    let file_name = format!("photo_{}{}", id, extension);
    state.files.put(&file_name, data).await?;

    let mut changes = Document::new();
    changes.insert(bootcamp::PHOTO.name.to_string(), Value::String(file_name.clone()));
    state
        .store
        .update(Collection::Bootcamp, id, changes)
        .await?
        .ok_or_else(|| ApiError::resource_not_found("Bootcamp", id))?;

    tracing::info!(bootcamp = %id, file = %file_name, "photo uploaded");
    Ok(ApiResponse::success(file_name))
}

/// Pull the image out of the `file` field, returning its bytes and extension
async fn receive_image(multipart: &mut Multipart, max: usize) -> Result<(Bytes, String), ApiError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let is_image = field.content_type().is_some_and(|ct| ct.starts_with("image"));
        if !is_image {
            return Err(ApiError::bad_request("Please upload an image"));
        }

        let extension = field
            .file_name()
            .and_then(|name| FsPath::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let data = read_limited(&mut field, max).await?;
        if data.is_empty() {
            break;
        }
        return Ok((data, extension));
    }
    Err(ApiError::bad_request("Please upload a file"))
}

/// Read the field into memory, failing as soon as it exceeds `max` bytes
async fn read_limited(field: &mut Field<'_>, max: usize) -> Result<Bytes, ApiError> {
    let mut buffer: Vec<u8> = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        if buffer.len() + chunk.len() > max {
            return Err(ApiError::bad_request(format!("Please upload an image less than {}", max)));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buffer))
}
