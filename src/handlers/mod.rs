// handlers/mod.rs - route handlers grouped by resource
//
// Public reads need no token. Writes extract `AuthUser`, check the role for
// the resource, then ownership on the stored record.

pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod system;
pub mod users;

use uuid::Uuid;

use crate::database::models::Role;
use crate::database::schema::{parse_id, Collection, Document, ID, OWNER};
use crate::database::Store;
use crate::error::ApiError;

/// Roles allowed to manage bootcamps and courses
pub const PUBLISHERS: [Role; 2] = [Role::Publisher, Role::Admin];

/// Roles allowed to write reviews
pub const REVIEWERS: [Role; 2] = [Role::User, Role::Admin];

/// Load a record by its raw path id. Malformed and unknown ids are both 404.
pub(crate) async fn find_or_404(
    store: &dyn Store,
    collection: Collection,
    raw_id: &str,
) -> Result<(Uuid, Document), ApiError> {
    let id = parse_id(raw_id).map_err(|_| ApiError::resource_not_found(collection.label(), raw_id))?;
    let doc = store
        .get(collection, id)
        .await?
        .ok_or_else(|| ApiError::resource_not_found(collection.label(), raw_id))?;
    Ok((id, doc))
}

/// Owning user id of a bootcamp, course or review
pub(crate) fn owner_of(doc: &Document) -> Result<Uuid, ApiError> {
    doc.get(OWNER.name)
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| {
            let id = doc.get(ID.name).and_then(|v| v.as_str()).unwrap_or("unknown");
            let message = format!("Record {} has no owner", id);
            tracing::error!("{}", message);
            ApiError::internal_server_error(message)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn ownerless_records_fail_with_a_descriptive_message() {
        let doc: Document = serde_json::from_value(json!({ "id": "6d1b3c6e-6f57-4a4c-9d43-2b1a1b7e1c11" })).unwrap();
        let err = owner_of(&doc).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Record 6d1b3c6e-6f57-4a4c-9d43-2b1a1b7e1c11 has no owner");
    }

    #[test]
    fn owner_is_read_from_the_user_field() {
        let owner = Uuid::new_v4();
        let doc: Document = serde_json::from_value(json!({ "id": "x", "user": owner.to_string() })).unwrap();
        assert_eq!(owner_of(&doc).unwrap(), owner);
    }
}
