pub mod memory;
pub mod models;
pub mod postgres;
pub mod schema;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use schema::{Collection, Document, FieldDef, FieldKind, FieldValue};
pub use store::{Store, StoreError};
