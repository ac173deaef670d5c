use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unknown field '{field}' for {collection}")]
    UnknownField { collection: &'static str, field: String },

    #[error("Field '{0}' cannot be used in a filter")]
    NotFilterable(String),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Unsupported operator for '{field}': {operator}")]
    UnsupportedOperator { field: String, operator: &'static str },
}
