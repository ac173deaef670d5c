// handlers/courses/collection.rs - GET /api/v1/courses, GET|POST /api/v1/bootcamps/:id/courses

use axum::extract::{rejection::JsonRejection, Path, RawQuery, State};
use axum::Json;
use validator::Validate;

use crate::database::models::NewCourse;
use crate::database::schema::{to_document, Collection, Document, FieldValue, BOOTCAMP_REF};
use crate::error::ApiError;
use crate::filter::{Condition, ListQuery, QueryParams};
use crate::handlers::{find_or_404, owner_of, PUBLISHERS};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListResponse};
use crate::services::advanced_results::{advanced_results, COURSE_BOOTCAMP};
use crate::state::AppState;

/// GET /api/v1/courses
pub async fn get(State(state): State<AppState>, RawQuery(query): RawQuery) -> Result<ListResponse<Document>, ApiError> {
    let params = QueryParams::from_query_string(query.as_deref());
    let results = advanced_results(
        state.store.as_ref(),
        Collection::Course,
        Some(&COURSE_BOOTCAMP),
        &params,
        &state.config.query,
    )
    .await?;
    Ok(results.into())
}

/// GET /api/v1/bootcamps/:id/courses
pub async fn bootcamp_courses_get(
    State(state): State<AppState>,
    Path(bootcamp_id): Path<String>,
) -> Result<ListResponse<Document>, ApiError> {
    let (bootcamp_id, _) = find_or_404(state.store.as_ref(), Collection::Bootcamp, &bootcamp_id).await?;
    let query = ListQuery::new().filter(Condition::eq(&BOOTCAMP_REF, FieldValue::Uuid(bootcamp_id)));
    let courses = state.store.find(Collection::Course, &query).await?;
    Ok(ListResponse::new(courses))
}

/// POST /api/v1/bootcamps/:id/courses - bootcamp owner or admin only
pub async fn post(
    State(state): State<AppState>,
    Path(bootcamp_id): Path<String>,
    user: AuthUser,
    payload: Result<Json<NewCourse>, JsonRejection>,
) -> ApiResult<Document> {
    user.authorize(&PUBLISHERS)?;
    let (bootcamp_id, bootcamp) = find_or_404(state.store.as_ref(), Collection::Bootcamp, &bootcamp_id).await?;
    user.ensure_can_modify(owner_of(&bootcamp)?, &format!("add a course to bootcamp {}", bootcamp_id))?;

    let Json(input) = payload?;
    input.validate()?;

    let course = input.into_course(bootcamp_id, user.id);
    let created = state.store.create(Collection::Course, to_document(&course)?).await?;
    Ok(ApiResponse::created(created))
}
