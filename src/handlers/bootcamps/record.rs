// handlers/bootcamps/record.rs - GET|PUT|DELETE /api/v1/bootcamps/:id

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde_json::Value;
use validator::Validate;

use crate::database::models::BootcampUpdate;
use crate::database::schema::{bootcamp, to_document, Collection, Document};
use crate::error::ApiError;
use crate::handlers::{find_or_404, owner_of, PUBLISHERS};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, MessageResponse};
use crate::services::advanced_results::{expand, BOOTCAMP_COURSES};
use crate::services::cascade;
use crate::state::AppState;

use super::locate;

/// GET /api/v1/bootcamps/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document> {
    let (_, doc) = find_or_404(state.store.as_ref(), Collection::Bootcamp, &id).await?;
    let mut docs = [doc];
    expand(state.store.as_ref(), &BOOTCAMP_COURSES, &mut docs).await?;
    let [doc] = docs;
    Ok(ApiResponse::success(doc))
}

/// PUT /api/v1/bootcamps/:id - partial update; a changed address is re-geocoded
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<BootcampUpdate>, JsonRejection>,
) -> ApiResult<Document> {
    user.authorize(&PUBLISHERS)?;
    let (id, existing) = find_or_404(state.store.as_ref(), Collection::Bootcamp, &id).await?;
    user.ensure_can_modify(owner_of(&existing)?, "update this bootcamp")?;

    let Json(update) = payload?;
    update.validate()?;

    let mut changes = to_document(&update)?;
    let current_address = existing.get(bootcamp::ADDRESS.name).and_then(Value::as_str);
    if let Some(address) = update.address.as_deref().filter(|a| current_address != Some(*a)) {
        let location = locate(state.geocoder.as_ref(), address).await?;
        changes.insert(bootcamp::LOCATION.name.to_string(), serde_json::to_value(location)?);
    }

    let updated = state
        .store
        .update(Collection::Bootcamp, id, changes)
        .await?
        .ok_or_else(|| ApiError::resource_not_found("Bootcamp", id))?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/bootcamps/:id - also removes the bootcamp's courses and reviews
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<MessageResponse, ApiError> {
    user.authorize(&PUBLISHERS)?;
    let (id, existing) = find_or_404(state.store.as_ref(), Collection::Bootcamp, &id).await?;
    user.ensure_can_modify(owner_of(&existing)?, "delete this bootcamp")?;

    let removed = cascade::delete_bootcamp(state.store.as_ref(), id).await?;
    tracing::info!(bootcamp = %id, courses = removed.courses, reviews = removed.reviews, "bootcamp deleted");

    Ok(MessageResponse::new(format!("Deleted bootcamp {}", id)))
}
