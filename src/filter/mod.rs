pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod params;
pub mod error;

pub use error::FilterError;
pub use filter::{Filter, SqlResult};
pub use params::{CompiledQuery, QueryParams};
pub use types::*;
