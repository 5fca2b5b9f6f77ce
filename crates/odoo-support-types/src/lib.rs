//! Shared types for the Odoo support agent.
//!
//! This crate holds the read-only record projections fetched from the remote
//! Odoo server, the tool definition shape shared by the voice agent and the
//! MCP server, and the allow-list that bounds generic record search.
//!
//! Odoo serializes an unset scalar field as `false` rather than `null`. The
//! record types here absorb that quirk at deserialization time so callers
//! only ever see `Option`.

pub mod records;

pub use records::{
    Company, Many2One, ModuleDependency, ModuleDetails, ModuleSummary, UserDetails, UserSummary,
};

use serde::{Deserialize, Serialize};

/// Odoo models that the generic `search_records` tool may query.
///
/// Anything outside this list is refused before a remote call is issued.
pub const SEARCHABLE_MODELS: &[&str] = &[
    "res.partner",
    "res.users",
    "res.company",
    "res.groups",
    "ir.module.module",
    "ir.module.module.dependency",
    "product.product",
    "product.template",
    "sale.order",
    "purchase.order",
    "account.move",
    "stock.picking",
    "crm.lead",
    "project.project",
    "project.task",
    "hr.employee",
];

/// Returns `true` if `model` is on the search allow-list.
pub fn is_searchable_model(model: &str) -> bool {
    SEARCHABLE_MODELS.contains(&model)
}

/// Definition of a tool exposed to a model or an MCP client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name (e.g., "get_user_info").
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema describing the tool's input object.
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Names of the required input properties, in schema order.
    pub fn required_arguments(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}
