pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue},
    middleware::from_fn_with_state,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::state::AppState;

pub use crate::config::AppConfig;
pub use crate::error::ApiError;

/// Full application router over the given state
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let uploads = ServeDir::new(&state.config.uploads.file_upload_path);

    let router = Router::new()
        // Public
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .nest("/api/v1", api_routes(state.clone()))
        // Photos saved by PUT /bootcamps/:id/photo
        .nest_service("/uploads", uploads)
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit));

    // Global middleware
    with_security_headers(router)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Browser hardening headers, unless a handler already set them
fn with_security_headers(router: Router<AppState>) -> Router<AppState> {
    let headers = [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
        (header::X_DNS_PREFETCH_CONTROL, "off"),
        (header::X_XSS_PROTECTION, "0"),
        (header::REFERRER_POLICY, "no-referrer"),
        (header::STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"),
        (HeaderName::from_static("x-download-options"), "noopen"),
    ];
    headers.into_iter().fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value)))
    })
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(bootcamp_routes())
        .merge(course_routes())
        .merge(review_routes())
        .merge(protected_routes(state))
}

fn bootcamp_routes() -> Router<AppState> {
    use handlers::bootcamps;

    Router::new()
        .route("/bootcamps", get(bootcamps::bootcamps_get).post(bootcamps::bootcamps_post))
        .route("/bootcamps/radius/:zipcode/:distance", get(bootcamps::radius_get))
        .route(
            "/bootcamps/:id",
            get(bootcamps::bootcamp_get)
                .put(bootcamps::bootcamp_put)
                .delete(bootcamps::bootcamp_delete),
        )
        // Upload size is enforced while streaming the file field
        .route(
            "/bootcamps/:id/photo",
            put(bootcamps::photo_put).layer(DefaultBodyLimit::disable()),
        )
}

fn course_routes() -> Router<AppState> {
    use handlers::courses;

    Router::new()
        .route(
            "/bootcamps/:id/courses",
            get(courses::bootcamp_courses_get).post(courses::courses_post),
        )
        .route("/courses", get(courses::courses_get))
        .route(
            "/courses/:id",
            get(courses::course_get).put(courses::course_put).delete(courses::course_delete),
        )
}

fn review_routes() -> Router<AppState> {
    use handlers::reviews;

    Router::new()
        .route(
            "/bootcamps/:id/reviews",
            get(reviews::bootcamp_reviews_get).post(reviews::reviews_post),
        )
        .route("/reviews", get(reviews::reviews_get))
        .route(
            "/reviews/:id",
            get(reviews::review_get).put(reviews::review_put).delete(reviews::review_delete),
        )
}

/// Routes where every method requires a valid token
fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::{auth, users};

    Router::new()
        .route("/auth/me", get(auth::me_get))
        .route("/users", get(users::users_get).post(users::users_post))
        .route(
            "/users/:id",
            get(users::user_get).put(users::user_put).delete(users::user_delete),
        )
        .route_layer(from_fn_with_state(state, middleware::require_auth))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
