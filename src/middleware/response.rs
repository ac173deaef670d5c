use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::filter::Pagination;
use crate::services::AdvancedResults;

/// `{success: true, data}` envelope for single records
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { data, status_code: StatusCode::OK }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self { data, status_code: StatusCode::CREATED }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return crate::error::ApiError::internal_server_error("").into_response();
            }
        };

        (self.status_code, Json(json!({ "success": true, "data": data_value }))).into_response()
    }
}

/// `{success: true, count, pagination?, data}` envelope for lists
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { success: true, count: data.len(), pagination: None, data }
    }
}

impl From<AdvancedResults> for ListResponse<crate::database::Document> {
    fn from(results: AdvancedResults) -> Self {
        Self {
            success: true,
            count: results.data.len(),
            pagination: Some(results.pagination),
            data: results.data,
        }
    }
}

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// `{success: true, msg}` envelope returned by deletes
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { success: true, msg: msg.into() }
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PageLink;

    #[test]
    fn list_envelope_counts_returned_rows() {
        let mut list = ListResponse::new(vec![json!({ "id": 1 }), json!({ "id": 2 })]);
        assert_eq!(serde_json::to_value(&list).unwrap(), json!({
            "success": true,
            "count": 2,
            "data": [{ "id": 1 }, { "id": 2 }],
        }));

        list.pagination = Some(Pagination { next: Some(PageLink { page: 2, limit: 2 }), prev: None });
        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(value["pagination"], json!({ "next": { "page": 2, "limit": 2 } }));
    }

    #[test]
    fn delete_envelope_uses_msg() {
        let value = serde_json::to_value(MessageResponse::new("Deleted course 1")).unwrap();
        assert_eq!(value, json!({ "success": true, "msg": "Deleted course 1" }));
    }
}
