//! Odoo support agent binary.
//!
//! Prepares the LiveKit room named on the command line (or
//! `SUPPORT_AGENT_ROOM`), waits for a user, binds the hosted model when
//! `OPENAI_API_KEY` is set, and serves its tool calls until Ctrl+C. The binary
//! carries no audio itself: the model's replies reach the room as chat
//! messages.

use odoo_support_rpc::{OdooConnection, OdooSettings};
use odoo_support_tools::{SupportTools, DEFAULT_LOG_FILE};
use odoo_support_voice::{
    LiveKitConfig, LiveKitRoomSession, RealtimeSettings, SupportAgent, VoiceService,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn resolve_room() -> Option<String> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SUPPORT_AGENT_ROOM").ok())
        .filter(|room| !room.trim().is_empty())
}

fn init_tracing() {
    let level = std::env::var("SUPPORT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let json = std::env::var("SUPPORT_LOG_JSON")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let Some(room) = resolve_room() else {
        eprintln!("usage: odoo-support-agent <room>");
        std::process::exit(2);
    };

    let connection = Arc::new(
        OdooConnection::new(OdooSettings::from_env())
            .expect("failed to build the Odoo HTTP client"),
    );
    let log_file = std::env::var("ODOO_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let tools = Arc::new(SupportTools::new(connection.clone(), log_file));
    let agent = SupportAgent::new(tools);

    let service = Arc::new(VoiceService::new(LiveKitConfig::from_env()));
    let mut session = LiveKitRoomSession::new(service, room.clone());
    match RealtimeSettings::from_env() {
        Some(settings) => session = session.with_realtime(settings),
        None => tracing::warn!("OPENAI_API_KEY not set, running without the model"),
    }

    match agent.entrypoint(&mut session).await {
        Ok(participant) => {
            tracing::info!(%room, identity = %participant.identity, "support session running");
        }
        Err(e) => {
            tracing::error!(%room, error = %e, "support session failed to start");
            session.close().await;
            connection.disconnect().await;
            std::process::exit(1);
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }

    session.close().await;
    connection.disconnect().await;
    tracing::info!(%room, "support session ended");
}
