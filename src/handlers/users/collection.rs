// handlers/users/collection.rs - GET|POST /api/v1/users (admin)

use axum::extract::{rejection::JsonRejection, RawQuery, State};
use axum::Json;
use validator::Validate;

use crate::database::models::{NewUser, Role};
use crate::database::schema::{to_document, Collection, Document};
use crate::error::ApiError;
use crate::filter::QueryParams;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListResponse};
use crate::services::advanced_results;
use crate::state::AppState;

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    RawQuery(query): RawQuery,
) -> Result<ListResponse<Document>, ApiError> {
    user.authorize(&[Role::Admin])?;
    let params = QueryParams::from_query_string(query.as_deref());
    let results = advanced_results(state.store.as_ref(), Collection::User, None, &params, &state.config.query).await?;
    Ok(results.into())
}

pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<Document> {
    user.authorize(&[Role::Admin])?;
    let Json(input) = payload?;
    input.validate()?;

    let created = state.store.create(Collection::User, to_document(&input.into_user())?).await?;
    Ok(ApiResponse::created(created))
}
