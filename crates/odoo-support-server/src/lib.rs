//! HTTP and WebSocket API for the Odoo support agent.
//!
//! Serves the browser client: health and feature checks, LiveKit join tokens,
//! support-room creation and a WebSocket echo channel.

pub mod api;
pub mod api_ws;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Extension, Router,
};
use config::Config;
use odoo_support_voice::VoiceService;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

pub struct AppState {
    pub config: Config,
    pub voice_service: Arc<VoiceService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let voice_service = Arc::new(VoiceService::new(config.livekit.clone()));
        Self {
            config,
            voice_service,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors.origins);

    Router::new()
        .route("/", get(api::root_handler))
        .route("/health", get(api::health_handler))
        .route("/config", get(api::config_handler))
        .route("/token", post(api::token_handler))
        .route("/create-room", post(api::create_room_handler))
        .route("/ws", get(api_ws::ws_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(Arc::new(state)))
}
