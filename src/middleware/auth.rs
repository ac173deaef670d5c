use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::decode_jwt;
use crate::database::models::{Role, User};
use crate::database::schema::{from_document, Collection};
use crate::error::ApiError;
use crate::state::AppState;

const NOT_AUTHORIZED: &str = "Not authorized to access this route";

/// Authenticated principal, loaded from the store on each request
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self { id: user.id, role: user.role, name: user.name }
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails unless the principal holds one of `roles`
    pub fn authorize(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.role) {
            return Ok(());
        }
        warn!(user = %self.id, role = %self.role, "role not permitted");
        Err(ApiError::unauthorized(format!(
            "User role {} is not authorized to access this route",
            self.role
        )))
    }

    /// Owners and admins may change a record; everyone else gets 401
    pub fn ensure_can_modify(&self, owner: Uuid, action: &str) -> Result<(), ApiError> {
        if owner == self.id || self.is_admin() {
            return Ok(());
        }
        warn!(user = %self.id, %owner, action, "ownership check failed");
        Err(ApiError::unauthorized(format!("User {} is not authorized to {}", self.id, action)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        let state = AppState::from_ref(state);
        authenticate(&state, &parts.headers).await
    }
}

/// Route layer that authenticates once and stores the principal in request extensions
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = extract_jwt_from_headers(headers).map_err(|msg| {
        warn!("Rejected request: {}", msg);
        ApiError::unauthorized(NOT_AUTHORIZED)
    })?;

    let claims = decode_jwt(&token, state.config.jwt_secret())?;

    let doc = state
        .store
        .get(Collection::User, claims.sub)
        .await?
        .ok_or_else(|| {
            warn!(user = %claims.sub, "token subject no longer exists");
            ApiError::unauthorized(NOT_AUTHORIZED)
        })?;

    let user: User = from_document(doc)?;
    Ok(user.into())
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
