// handlers/reviews/record.rs - GET|PUT|DELETE /api/v1/reviews/:id

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::database::models::ReviewUpdate;
use crate::database::schema::{to_document, Collection, Document, BOOTCAMP_REF};
use crate::error::ApiError;
use crate::handlers::{find_or_404, owner_of, REVIEWERS};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, MessageResponse};
use crate::services::advanced_results::{expand, REVIEW_BOOTCAMP};
use crate::services::refresh_average_rating;
use crate::state::AppState;

/// GET /api/v1/reviews/:id - with bootcamp name and description embedded
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document> {
    let (_, doc) = find_or_404(state.store.as_ref(), Collection::Review, &id).await?;
    let mut docs = [doc];
    expand(state.store.as_ref(), &REVIEW_BOOTCAMP, &mut docs).await?;
    let [doc] = docs;
    Ok(ApiResponse::success(doc))
}

pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<ReviewUpdate>, JsonRejection>,
) -> ApiResult<Document> {
    user.authorize(&REVIEWERS)?;
    let (id, existing) = find_or_404(state.store.as_ref(), Collection::Review, &id).await?;
    user.ensure_can_modify(owner_of(&existing)?, "update this review")?;

    let Json(update) = payload?;
    update.validate()?;

    let updated = state
        .store
        .update(Collection::Review, id, to_document(&update)?)
        .await?
        .ok_or_else(|| ApiError::resource_not_found("Review", id))?;

    if update.rating.is_some() {
        if let Some(bootcamp_id) = parent_bootcamp(&updated) {
            refresh_average_rating(state.store.as_ref(), bootcamp_id).await?;
        }
    }
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/reviews/:id - recomputes the bootcamp's rating afterwards
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<MessageResponse, ApiError> {
    user.authorize(&REVIEWERS)?;
    let (id, existing) = find_or_404(state.store.as_ref(), Collection::Review, &id).await?;
    user.ensure_can_modify(owner_of(&existing)?, "delete this review")?;

    state.store.delete(Collection::Review, id).await?;
    if let Some(bootcamp_id) = parent_bootcamp(&existing) {
        refresh_average_rating(state.store.as_ref(), bootcamp_id).await?;
    }

    Ok(MessageResponse::new(format!("Deleted review {}", id)))
}

fn parent_bootcamp(review: &Document) -> Option<Uuid> {
    review
        .get(BOOTCAMP_REF.name)
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}
