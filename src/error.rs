// HTTP API error types
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::JwtError;
use crate::database::StoreError;
use crate::filter::FilterError;
use crate::services::{GeocodeError, QueryError, StorageError};

pub const DUPLICATE_MESSAGE: &str = "Duplicate field value entered";
const SERVER_ERROR: &str = "Server Error";

/// Every failure a request can end in. Rendered as `{success: false, message}`.
#[derive(Debug)]
pub enum ApiError {
    // 400
    BadRequest(String),
    Validation(Vec<String>),
    InvalidJson(String),
    Conflict,

    // 401
    Unauthorized(String),

    // 404
    NotFound(String),

    // 429
    TooManyRequests(String),

    // 500
    InternalServerError(String),

    // 502 (geocoder failures)
    BadGateway(String),

    // 503
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::Validation(_)
            | ApiError::InvalidJson(_)
            | ApiError::Conflict => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-facing message; never empty
    pub fn message(&self) -> String {
        let message = match self {
            ApiError::Validation(messages) => messages.join(", "),
            ApiError::Conflict => DUPLICATE_MESSAGE.to_string(),
            ApiError::BadRequest(msg)
            | ApiError::InvalidJson(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::TooManyRequests(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg) => msg.clone(),
        };
        if message.trim().is_empty() {
            SERVER_ERROR.to_string()
        } else {
            message
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "message": self.message(),
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// `"<Label> with param id <id> not found"`
    pub fn resource_not_found(label: &str, id: impl std::fmt::Display) -> Self {
        ApiError::NotFound(format!("{} with param id {} not found", label, id))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(value) => ApiError::resource_not_found("Resource", value),
            StoreError::Duplicate { collection, fields } => {
                tracing::debug!("Duplicate {} on ({})", collection, fields);
                ApiError::Conflict
            }
            StoreError::AlreadyOwned { collection, owner } => ApiError::BadRequest(format!(
                "The user with id {} has already published a {}",
                owner,
                collection.to_lowercase()
            )),
            StoreError::InvalidValue { field, message } => {
                ApiError::Validation(vec![format!("{}: {}", field, message)])
            }
            StoreError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                ApiError::ServiceUnavailable("Database temporarily unavailable".to_string())
            }
            StoreError::Sqlx(sqlx::Error::PoolTimedOut) => {
                tracing::error!("Database pool timed out");
                ApiError::ServiceUnavailable("Database temporarily unavailable".to_string())
            }
            // Don't expose internals to clients
            other => {
                tracing::error!("Store error: {}", other);
                ApiError::InternalServerError(SERVER_ERROR.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {}", err);
        ApiError::InternalServerError(SERVER_ERROR.to_string())
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Filter(e) => e.into(),
            QueryError::Store(e) => e.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
            })
            .collect();
        ApiError::Validation(messages)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidJson(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotConfigured => {
                ApiError::ServiceUnavailable("Geocoding is not configured".to_string())
            }
            other => {
                tracing::error!("Geocoder error: {}", other);
                ApiError::BadGateway("Geocoding service error".to_string())
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!("File storage error: {}", err);
        ApiError::InternalServerError("Problem with file upload".to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken(_) => ApiError::unauthorized("Not authorized to access this route"),
            other => {
                tracing::error!("JWT error: {}", other);
                ApiError::InternalServerError(SERVER_ERROR.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
