use crate::catalog::mcp_tool_definitions;
use crate::tools::{is_error_payload, OdooMcpTools};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::Value;
use std::sync::Arc;

/// Name reported in the `initialize` response.
pub const SERVER_NAME: &str = "odoo-support-mcp";

/// Odoo tool server for MCP clients.
///
/// Protocol handling (framing, version negotiation, request routing) is done
/// by `rmcp`; this type lists the tools and runs them.
#[derive(Debug, Clone)]
pub struct McpServer {
    tools: OdooMcpTools,
}

impl McpServer {
    pub fn new(tools: OdooMcpTools) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &OdooMcpTools {
        &self.tools
    }

    /// The catalog as MCP tool descriptors.
    pub fn tool_list(&self) -> Vec<Tool> {
        mcp_tool_definitions()
            .into_iter()
            .map(|def| {
                let schema: JsonObject = match def.input_schema {
                    Value::Object(map) => map,
                    _ => JsonObject::new(),
                };
                Tool::new(def.name, def.description, Arc::new(schema))
            })
            .collect()
    }

    /// Runs one tool. The JSON result becomes a single text item; error
    /// payloads are flagged with `isError`.
    pub async fn run_tool(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let arguments = arguments.map(Value::Object).unwrap_or(Value::Null);
        let payload = self.tools.call(name, arguments).await;
        let content = vec![Content::text(payload.to_string())];

        if is_error_payload(&payload) {
            tracing::warn!(tool = name, "tool call failed");
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                title: Some("Odoo Support".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-mostly access to an Odoo server: modules, users, company, database \
                 info and allow-listed record search."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tool_list()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::debug!(tool = %request.name, "tools/call");
        Ok(self.run_tool(&request.name, request.arguments).await)
    }
}
