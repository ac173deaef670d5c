// handlers/courses/record.rs - GET|PUT|DELETE /api/v1/courses/:id

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use validator::Validate;

use crate::database::models::CourseUpdate;
use crate::database::schema::{to_document, Collection, Document};
use crate::error::ApiError;
use crate::handlers::{find_or_404, owner_of, PUBLISHERS};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, MessageResponse};
use crate::services::advanced_results::{expand, COURSE_BOOTCAMP};
use crate::state::AppState;

/// GET /api/v1/courses/:id - with bootcamp name and description embedded
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document> {
    let (_, doc) = find_or_404(state.store.as_ref(), Collection::Course, &id).await?;
    let mut docs = [doc];
    expand(state.store.as_ref(), &COURSE_BOOTCAMP, &mut docs).await?;
    let [doc] = docs;
    Ok(ApiResponse::success(doc))
}

pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<CourseUpdate>, JsonRejection>,
) -> ApiResult<Document> {
    user.authorize(&PUBLISHERS)?;
    let (id, existing) = find_or_404(state.store.as_ref(), Collection::Course, &id).await?;
    user.ensure_can_modify(owner_of(&existing)?, "update this course")?;

    let Json(update) = payload?;
    update.validate()?;

    let updated = state
        .store
        .update(Collection::Course, id, to_document(&update)?)
        .await?
        .ok_or_else(|| ApiError::resource_not_found("Course", id))?;
    Ok(ApiResponse::success(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<MessageResponse, ApiError> {
    user.authorize(&PUBLISHERS)?;
    let (id, existing) = find_or_404(state.store.as_ref(), Collection::Course, &id).await?;
    user.ensure_can_modify(owner_of(&existing)?, "delete this course")?;

    state.store.delete(Collection::Course, id).await?;
    Ok(MessageResponse::new(format!("Deleted course {}", id)))
}
