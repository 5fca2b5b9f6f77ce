use odoo_support_types::ToolDefinition;
use serde_json::json;

/// Names of the MCP tools, in `tools/list` order.
pub const MCP_TOOL_NAMES: &[&str] = &[
    "list_modules",
    "get_module_info",
    "list_users",
    "get_user_details",
    "search_records",
    "get_database_info",
    "get_company_info",
    "check_module_dependencies",
];

fn no_arguments() -> serde_json::Value {
    json!({"type": "object", "properties": {}})
}

fn module_name_argument() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "module_name": {
                "type": "string",
                "description": "Technical name of the module"
            }
        },
        "required": ["module_name"]
    })
}

pub fn mcp_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "list_modules",
            "List all Odoo modules with their state and version",
            no_arguments(),
        ),
        ToolDefinition::new(
            "get_module_info",
            "Get detailed information about a specific module",
            module_name_argument(),
        ),
        ToolDefinition::new("list_users", "List all Odoo users", no_arguments()),
        ToolDefinition::new(
            "get_user_details",
            "Get detailed information about a specific user",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "integer",
                        "description": "ID of the user"
                    }
                },
                "required": ["user_id"]
            }),
        ),
        ToolDefinition::new(
            "search_records",
            "Search records in an allow-listed Odoo model",
            json!({
                "type": "object",
                "properties": {
                    "model": {
                        "type": "string",
                        "description": "Model name (e.g., 'res.partner', 'sale.order')",
                        "enum": odoo_support_types::SEARCHABLE_MODELS
                    },
                    "domain": {
                        "type": "array",
                        "description": "Search domain (Odoo format)"
                    },
                    "fields": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Fields to retrieve"
                    }
                },
                "required": ["model", "domain"]
            }),
        ),
        ToolDefinition::new(
            "get_database_info",
            "Get Odoo database and connection information",
            no_arguments(),
        ),
        ToolDefinition::new(
            "get_company_info",
            "Get company information from Odoo",
            no_arguments(),
        ),
        ToolDefinition::new(
            "check_module_dependencies",
            "Check dependencies for a specific module",
            module_name_argument(),
        ),
    ]
}
