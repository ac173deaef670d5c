// handlers/bootcamps/collection.rs - GET|POST /api/v1/bootcamps

use axum::extract::{rejection::JsonRejection, RawQuery, State};
use axum::Json;
use validator::Validate;

use crate::database::models::NewBootcamp;
use crate::database::schema::{to_document, Collection, Document};
use crate::error::ApiError;
use crate::filter::QueryParams;
use crate::handlers::PUBLISHERS;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListResponse};
use crate::services::advanced_results::{advanced_results, BOOTCAMP_COURSES};
use crate::state::AppState;

use super::locate;

/// GET /api/v1/bootcamps - filtered, sorted, paginated list with courses attached
pub async fn get(State(state): State<AppState>, RawQuery(query): RawQuery) -> Result<ListResponse<Document>, ApiError> {
    let params = QueryParams::from_query_string(query.as_deref());
    let results = advanced_results(
        state.store.as_ref(),
        Collection::Bootcamp,
        Some(&BOOTCAMP_COURSES),
        &params,
        &state.config.query,
    )
    .await?;
    Ok(results.into())
}

/// POST /api/v1/bootcamps - one bootcamp per publisher; admins may own many
pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<NewBootcamp>, JsonRejection>,
) -> ApiResult<Document> {
    user.authorize(&PUBLISHERS)?;
    let Json(input) = payload?;
    input.validate()?;

    let location = match input.address.as_deref() {
        Some(address) => locate(state.geocoder.as_ref(), address).await?,
        None => None,
    };

    let bootcamp = input.into_bootcamp(user.id, location);
    let doc = to_document(&bootcamp)?;
    let created = if user.is_admin() {
        state.store.create(Collection::Bootcamp, doc).await?
    } else {
        state.store.create_sole_owned(Collection::Bootcamp, user.id, doc).await?
    };
    tracing::info!(bootcamp = %bootcamp.id, owner = %user.id, "bootcamp created");

    Ok(ApiResponse::created(created))
}
