//! Model-Context-Protocol tool server for Odoo.
//!
//! Exposes read-mostly Odoo operations to MCP clients through the `rmcp`
//! SDK over stdio. Generic record search is limited to the models in
//! [`odoo_support_types::SEARCHABLE_MODELS`].

pub mod catalog;
pub mod server;
pub mod tools;

pub use catalog::{mcp_tool_definitions, MCP_TOOL_NAMES};
pub use server::{McpServer, SERVER_NAME};
pub use tools::{error_payload, is_error_payload, OdooMcpTools};
