use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::UserStore,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::RecommendationBridge,
};

pub mod recommendations;
pub mod users;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub bridge: RecommendationBridge,
    pub token_secret: String,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/users", user_routes())
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(make_span_with_request_id),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// Routes under /users; all but the guest pair require a bearer token.
fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/favorites",
            get(users::get_favorites).post(users::toggle_favorite),
        )
        .route(
            "/visited",
            get(users::get_visited)
                .post(users::record_visit)
                .put(users::update_visit),
        )
        .route(
            "/recommendations/:location",
            get(recommendations::recommend),
        )
        .route("/location", get(users::get_location).patch(users::set_location))
        .route("/filters", get(users::get_filters).patch(users::set_filters))
        .route("/guest/location", get(users::guest_location))
        .route("/guest/filters", get(users::guest_filters))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
