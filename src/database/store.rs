use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::filter::{Condition, ListQuery};
use crate::services::geo::GeoPoint;

use super::schema::{Collection, Document, FieldDef};

/// Errors raised by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Duplicate value for {collection} ({fields})")]
    Duplicate { collection: &'static str, fields: String },

    #[error("User {owner} already owns a {collection}")]
    AlreadyOwned { collection: &'static str, owner: Uuid },

    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Query error: {0}")]
    Query(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Persistent document store shared by every request handler.
///
/// Documents are keyed by API field names. Writes enforce each collection's
/// unique keys and report violations as [`StoreError::Duplicate`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn find(&self, collection: Collection, query: &ListQuery) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, collection: Collection, conditions: &[Condition]) -> Result<u64, StoreError>;

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Insert a complete document (id and createdAt included) and return it as stored
    async fn create(&self, collection: Collection, doc: Document) -> Result<Document, StoreError>;

    /// Insert like [`Store::create`] unless `owner` already owns a record in
    /// the collection. The check and the insert are atomic with respect to
    /// other writers for the same owner.
    async fn create_sole_owned(&self, collection: Collection, owner: Uuid, doc: Document) -> Result<Document, StoreError>;

    /// Merge `changes` into the record; `None` when the id does not exist
    async fn update(&self, collection: Collection, id: Uuid, changes: Document) -> Result<Option<Document>, StoreError>;

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError>;

    async fn delete_many(&self, collection: Collection, conditions: &[Condition]) -> Result<u64, StoreError>;

    /// Mean of a numeric field over matching records, `None` when nothing matches
    async fn average(&self, collection: Collection, field: &'static FieldDef, conditions: &[Condition]) -> Result<Option<f64>, StoreError>;

    /// Bootcamps whose location lies within `radians` of `center` on the sphere
    async fn bootcamps_within(&self, center: GeoPoint, radians: f64) -> Result<Vec<Document>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
