use odoo_support_types::ToolDefinition;
use serde_json::json;

/// Names of the agent tools, in catalog order.
pub const TOOL_NAMES: &[&str] = &[
    "check_odoo_status",
    "get_installed_modules",
    "install_module",
    "update_module",
    "get_user_info",
    "create_user",
    "reset_user_password",
    "get_server_logs",
    "analyze_error",
];

/// Schemas of the agent tools, handed to the speech model at session start.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "check_odoo_status",
            "Check if the Odoo instance is running and accessible",
            json!({"type": "object", "properties": {}}),
        ),
        ToolDefinition::new(
            "get_installed_modules",
            "Get a list of all installed Odoo modules",
            json!({"type": "object", "properties": {}}),
        ),
        ToolDefinition::new(
            "install_module",
            "Install a specific Odoo module by name",
            json!({
                "type": "object",
                "properties": {
                    "module_name": {
                        "type": "string",
                        "description": "The technical name of the module to install"
                    }
                },
                "required": ["module_name"]
            }),
        ),
        ToolDefinition::new(
            "update_module",
            "Update a specific Odoo module by name",
            json!({
                "type": "object",
                "properties": {
                    "module_name": {
                        "type": "string",
                        "description": "The technical name of the module to update"
                    }
                },
                "required": ["module_name"]
            }),
        ),
        ToolDefinition::new(
            "get_user_info",
            "Get information about a user by email or login",
            json!({
                "type": "object",
                "properties": {
                    "user_identifier": {
                        "type": "string",
                        "description": "Email or login of the user"
                    }
                },
                "required": ["user_identifier"]
            }),
        ),
        ToolDefinition::new(
            "create_user",
            "Create a new Odoo user",
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Full name of the user"},
                    "login": {"type": "string", "description": "Login username"},
                    "email": {"type": "string", "description": "Email address"},
                    "password": {"type": "string", "description": "Initial password"}
                },
                "required": ["name", "login", "email", "password"]
            }),
        ),
        ToolDefinition::new(
            "reset_user_password",
            "Reset a user's password",
            json!({
                "type": "object",
                "properties": {
                    "user_identifier": {
                        "type": "string",
                        "description": "Email or login of the user"
                    },
                    "new_password": {
                        "type": "string",
                        "description": "New password for the user"
                    }
                },
                "required": ["user_identifier", "new_password"]
            }),
        ),
        ToolDefinition::new(
            "get_server_logs",
            "Get recent server logs to help diagnose issues",
            json!({
                "type": "object",
                "properties": {
                    "lines": {
                        "type": "integer",
                        "description": "Number of recent log lines to retrieve",
                        "default": crate::logs::DEFAULT_LOG_LINES
                    }
                }
            }),
        ),
        ToolDefinition::new(
            "analyze_error",
            "Analyze an error message and suggest solutions",
            json!({
                "type": "object",
                "properties": {
                    "error_message": {
                        "type": "string",
                        "description": "The error message to analyze"
                    }
                },
                "required": ["error_message"]
            }),
        ),
    ]
}
