use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod catalog;
mod error;
pub mod events;
mod observability;
mod scan;
mod shows;
mod types;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }
}

#[must_use]
pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState { shared })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/shows", get(shows::list_shows).post(shows::add_show))
        .route(
            "/shows/{index}",
            get(shows::get_show)
                .put(shows::update_show)
                .delete(shows::remove_show),
        )
        .route("/shows/{index}/reset", post(shows::reset_show))
        .route("/shows/{index}/episodes", get(shows::list_episodes))
        .route("/catalog", get(catalog::list_catalog))
        .route(
            "/catalog/{name}",
            put(catalog::set_entry).delete(catalog::remove_entry),
        )
        .route("/catalog/{name}/rename", post(catalog::rename_entry))
        .route("/scan", get(scan::get_status).post(scan::start_scan))
        .route("/scan/stop", post(scan::stop_scan))
        .route("/metrics", get(observability::get_metrics))
        .merge(events::router())
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
