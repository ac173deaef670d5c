// handlers/users/record.rs - GET|PUT|DELETE /api/v1/users/:id (admin)

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use validator::Validate;

use crate::database::models::{Role, UserUpdate};
use crate::database::schema::{to_document, Collection, Document};
use crate::error::ApiError;
use crate::handlers::find_or_404;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, MessageResponse};
use crate::services::cascade;
use crate::state::AppState;

pub async fn get(State(state): State<AppState>, Path(id): Path<String>, user: AuthUser) -> ApiResult<Document> {
    user.authorize(&[Role::Admin])?;
    let (_, doc) = find_or_404(state.store.as_ref(), Collection::User, &id).await?;
    Ok(ApiResponse::success(doc))
}

pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<Document> {
    user.authorize(&[Role::Admin])?;
    let (id, _) = find_or_404(state.store.as_ref(), Collection::User, &id).await?;

    let Json(update) = payload?;
    update.validate()?;

    let updated = state
        .store
        .update(Collection::User, id, to_document(&update)?)
        .await?
        .ok_or_else(|| ApiError::resource_not_found("User", id))?;
    Ok(ApiResponse::success(updated))
}

/// Also removes the user's bootcamps, courses and reviews
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<MessageResponse, ApiError> {
    user.authorize(&[Role::Admin])?;
    let (id, _) = find_or_404(state.store.as_ref(), Collection::User, &id).await?;
    cascade::delete_user(state.store.as_ref(), id).await?;
    Ok(MessageResponse::new(format!("Deleted user {}", id)))
}
