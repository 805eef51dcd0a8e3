//! HTTP surface of the tablegate service
//!
//! One table, three verbs. GET runs a client-supplied statement carried in
//! the query string, POST runs one from the body (or performs the structured
//! insert), and OPTIONS is answered by the CORS layer before it reaches the
//! router. Every other method is refused with 405.

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod routes;
pub mod state;

pub use state::{AppConfig, AppState};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::table::create_router())
        .merge(routes::health::create_router())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open CORS policy carried over from the service this replaces: any origin,
/// the three supported methods, Content-Type as the only allowed header.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
