//! API handlers for the support server.

use crate::AppState;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use odoo_support_voice::VoiceError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Body of `POST /token` and `POST /create-room`.
#[derive(Debug, Deserialize)]
pub struct ConnectionRequest {
    pub room_name: String,
    pub participant_name: String,
}

impl ConnectionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.room_name.trim().is_empty() {
            return Err(ApiError::BadRequest("room_name must not be empty".into()));
        }
        if self.participant_name.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "participant_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomResponse {
    pub room_name: String,
    pub sid: String,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        ApiError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Handler for `GET /`.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "Odoo Technical Support Agent"
    }))
}

/// Handler for `GET /health`.
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "livekit_configured": state.voice_service.is_configured(),
        "odoo_configured": state.config.odoo.is_configured(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Handler for `GET /config`: what the browser client needs to start.
pub async fn config_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "livekit_url": state.voice_service.get_url(),
        "features": {
            "voice": true,
            "screen_sharing": true,
            "mcp": true
        }
    }))
}

fn ensure_livekit(state: &AppState) -> Result<(), ApiError> {
    if state.voice_service.is_configured() {
        Ok(())
    } else {
        Err(VoiceError::NotConfigured.into())
    }
}

/// Handler for `POST /token`.
pub async fn token_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ConnectionRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    ensure_livekit(&state)?;
    payload.validate()?;

    let token = state
        .voice_service
        .generate_join_token(
            &payload.room_name,
            &payload.participant_name,
            &payload.participant_name,
        )
        .map_err(|e| {
            tracing::error!(error = %e, "error creating token");
            ApiError::from(e)
        })?;

    tracing::info!(
        room = %payload.room_name,
        participant = %payload.participant_name,
        "issued join token"
    );

    Ok(Json(TokenResponse {
        token,
        url: state.voice_service.get_url().to_string(),
    }))
}

/// Handler for `POST /create-room`.
pub async fn create_room_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ConnectionRequest>,
) -> Result<Json<RoomResponse>, ApiError> {
    ensure_livekit(&state)?;
    payload.validate()?;

    let room = state
        .voice_service
        .create_room(&payload.room_name)
        .await
        .map_err(|e| {
            tracing::error!(room = %payload.room_name, error = %e, "error creating room");
            ApiError::from(e)
        })?;

    Ok(Json(RoomResponse {
        room_name: room.name,
        sid: room.sid,
    }))
}
