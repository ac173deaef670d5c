// handlers/reviews/collection.rs - GET /api/v1/reviews, GET|POST /api/v1/bootcamps/:id/reviews

use axum::extract::{rejection::JsonRejection, Path, RawQuery, State};
use axum::Json;
use validator::Validate;

use crate::database::models::NewReview;
use crate::database::schema::{to_document, Collection, Document, FieldValue, BOOTCAMP_REF};
use crate::error::ApiError;
use crate::filter::{Condition, ListQuery, QueryParams};
use crate::handlers::{find_or_404, REVIEWERS};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListResponse};
use crate::services::advanced_results::{advanced_results, REVIEW_BOOTCAMP};
use crate::services::refresh_average_rating;
use crate::state::AppState;

/// GET /api/v1/reviews
pub async fn get(State(state): State<AppState>, RawQuery(query): RawQuery) -> Result<ListResponse<Document>, ApiError> {
    let params = QueryParams::from_query_string(query.as_deref());
    let results = advanced_results(
        state.store.as_ref(),
        Collection::Review,
        Some(&REVIEW_BOOTCAMP),
        &params,
        &state.config.query,
    )
    .await?;
    Ok(results.into())
}

/// GET /api/v1/bootcamps/:id/reviews
pub async fn bootcamp_reviews_get(
    State(state): State<AppState>,
    Path(bootcamp_id): Path<String>,
) -> Result<ListResponse<Document>, ApiError> {
    let (bootcamp_id, _) = find_or_404(state.store.as_ref(), Collection::Bootcamp, &bootcamp_id).await?;
    let query = ListQuery::new().filter(Condition::eq(&BOOTCAMP_REF, FieldValue::Uuid(bootcamp_id)));
    let reviews = state.store.find(Collection::Review, &query).await?;
    Ok(ListResponse::new(reviews))
}

/// POST /api/v1/bootcamps/:id/reviews - one review per user per bootcamp
pub async fn post(
    State(state): State<AppState>,
    Path(bootcamp_id): Path<String>,
    user: AuthUser,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> ApiResult<Document> {
    user.authorize(&REVIEWERS)?;
    let (bootcamp_id, _) = find_or_404(state.store.as_ref(), Collection::Bootcamp, &bootcamp_id).await?;

    let Json(input) = payload?;
    input.validate()?;

    let review = input.into_review(bootcamp_id, user.id);
    let created = state.store.create(Collection::Review, to_document(&review)?).await?;
    refresh_average_rating(state.store.as_ref(), bootcamp_id).await?;

    Ok(ApiResponse::created(created))
}
