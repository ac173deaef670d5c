// handlers/auth/me.rs - GET /api/v1/auth/me

use axum::extract::State;

use crate::database::schema::{Collection, Document};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// The authenticated user's own record
pub async fn get(State(state): State<AppState>, user: AuthUser) -> ApiResult<Document> {
    let doc = state
        .store
        .get(Collection::User, user.id)
        .await?
        .ok_or_else(|| ApiError::resource_not_found("User", user.id))?;
    Ok(ApiResponse::success(doc))
}
