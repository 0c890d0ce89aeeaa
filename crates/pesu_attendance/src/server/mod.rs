use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::server::endpoints::{portal, status};
use crate::types::AppState;

mod endpoints;
mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Both endpoints run the full scrape with a fresh login
    let api_router = Router::new()
        .route("/login", post(portal::post_login))
        .route("/refresh", post(portal::post_refresh));

    Router::new()
        .route("/", get(status::get_index))
        .nest("/api", api_router)
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
