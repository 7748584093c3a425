pub mod config;
pub mod huggingface_adapter;
pub mod openai_adapter;
pub mod socket;

#[cfg(test)]
mod test_support;

use axum::{Router, routing::get};
use std::path::Path;
use std::sync::Arc;
use topic_chat_core::Generator;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Shared state handed to every connection. The generator wraps the single
/// model client built at startup.
pub struct AppState {
    pub generator: Generator,
}

impl AppState {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }
}

/// Builds the application router.
///
/// *   `GET /` serves `index.html` from `static_dir`.
/// *   `GET /static/*` serves the page's assets.
/// *   `GET /ws` upgrades to the chat event channel.
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    // Configure a permissive CORS policy to allow connections from any origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .route("/ws", get(socket::ws_handler))
        .layer(cors)
        .with_state(state)
}
