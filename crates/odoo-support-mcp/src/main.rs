//! MCP server binary. Speaks MCP on stdin/stdout, so every log line goes to
//! stderr.

use odoo_support_mcp::{McpServer, OdooMcpTools};
use odoo_support_rpc::{OdooConnection, OdooSettings};
use rmcp::{transport::stdio, ServiceExt};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let level = std::env::var("SUPPORT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let settings = OdooSettings::from_env();
    tracing::info!(host = settings.host(), port = settings.port, "starting MCP server");

    let connection = Arc::new(
        OdooConnection::new(settings).expect("failed to build the Odoo HTTP client"),
    );
    let server = McpServer::new(OdooMcpTools::new(connection.clone()));

    match server.serve(stdio()).await {
        Ok(running) => {
            if let Err(e) = running.waiting().await {
                tracing::error!(error = %e, "MCP server stopped");
            }
        }
        Err(e) => tracing::error!(error = %e, "MCP handshake failed"),
    }

    tracing::info!("MCP client closed the stream");
    connection.disconnect().await;
}
