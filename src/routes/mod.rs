use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};
use crate::state::AppState;

pub mod recommendation;
pub mod users;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // The mobile client is served from an arbitrary origin, so CORS is
    // deliberately permissive.
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/recommendation",
            get(recommendation::health)
                .post(recommendation::generate)
                .options(preflight)
                .fallback(recommendation::method_not_allowed),
        )
        .route("/checkUser", get(users::check_user).options(preflight))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Liveness endpoint for the hosting platform
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Empty 204 for bare `OPTIONS` probes.
///
/// Real browser preflights (`OPTIONS` carrying
/// `Access-Control-Request-Method`) are intercepted and answered by the CORS
/// layer before routing; this handler only sees non-preflight `OPTIONS`,
/// which some HTTP clients send as a capability check.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
