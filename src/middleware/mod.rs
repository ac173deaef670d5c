pub mod auth;
pub mod rate_limit;
pub mod response;

pub use auth::{require_auth, AuthUser};
pub use rate_limit::{rate_limit, RateLimiter};
pub use response::{ApiResponse, ApiResult, ListResponse, MessageResponse};
