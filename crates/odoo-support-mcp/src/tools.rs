use odoo_support_rpc::{Domain, OdooConnection, OdooSession, RpcError};
use odoo_support_types::{
    is_searchable_model, Company, ModuleDependency, ModuleDetails, ModuleSummary, UserDetails,
    UserSummary,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

const MODULE_MODEL: &str = "ir.module.module";
const DEPENDENCY_MODEL: &str = "ir.module.module.dependency";
const USER_MODEL: &str = "res.users";
const COMPANY_MODEL: &str = "res.company";

#[derive(Debug, Deserialize)]
struct ModuleArgs {
    module_name: String,
}

#[derive(Debug, Deserialize)]
struct UserIdArgs {
    user_id: i64,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    model: String,
    domain: Vec<Value>,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

/// Builds the `{"error": message}` payload every MCP tool fails with.
pub fn error_payload(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

/// True when `value` is a tool failure payload.
pub fn is_error_payload(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.len() == 1 && map.contains_key("error"))
}

/// Read-mostly Odoo operations exposed to MCP clients.
///
/// Results are JSON values ready to be returned to the client. Remote
/// failures never escape: they come back as [`error_payload`]s.
#[derive(Debug, Clone)]
pub struct OdooMcpTools {
    connection: Arc<OdooConnection>,
}

impl OdooMcpTools {
    pub fn new(connection: Arc<OdooConnection>) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &Arc<OdooConnection> {
        &self.connection
    }

    /// Dispatches a `tools/call` request by name.
    pub async fn call(&self, name: &str, arguments: Value) -> Value {
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments
        };

        match name {
            "list_modules" => self.list_modules().await,
            "get_module_info" => match parse_args::<ModuleArgs>(name, arguments) {
                Ok(args) => self.get_module_info(&args.module_name).await,
                Err(payload) => payload,
            },
            "list_users" => self.list_users().await,
            "get_user_details" => match parse_args::<UserIdArgs>(name, arguments) {
                Ok(args) => self.get_user_details(args.user_id).await,
                Err(payload) => payload,
            },
            "search_records" => match parse_args::<SearchArgs>(name, arguments) {
                Ok(args) => {
                    self.search_records(&args.model, args.domain, args.fields.as_deref())
                        .await
                }
                Err(payload) => payload,
            },
            "get_database_info" => self.get_database_info().await,
            "get_company_info" => self.get_company_info().await,
            "check_module_dependencies" => match parse_args::<ModuleArgs>(name, arguments) {
                Ok(args) => self.check_module_dependencies(&args.module_name).await,
                Err(payload) => payload,
            },
            _ => {
                tracing::warn!(tool = name, "unknown MCP tool requested");
                error_payload(format!("Unknown tool: {}", name))
            }
        }
    }

    pub async fn list_modules(&self) -> Value {
        let result = async {
            let session = self.connection.connect().await?;
            let modules = session.model(MODULE_MODEL);
            let ids = modules.search(&Domain::new()).await?;
            modules.read::<ModuleSummary>(&ids, ModuleSummary::FIELDS).await
        }
        .await;
        respond("listing modules", result)
    }

    pub async fn get_module_info(&self, module_name: &str) -> Value {
        let result = async {
            let session = self.connection.connect().await?;
            let Some(id) = find_module(&session, module_name).await? else {
                return Ok(None);
            };
            let mut rows = session
                .model(MODULE_MODEL)
                .read::<ModuleDetails>(&[id], ModuleDetails::FIELDS)
                .await?;
            Ok::<_, RpcError>(rows.pop())
        }
        .await;

        match result {
            Ok(Some(module)) => to_payload(&module),
            Ok(None) => error_payload(format!("Module {} not found", module_name)),
            Err(e) => failure("getting module info", e),
        }
    }

    pub async fn list_users(&self) -> Value {
        let result = async {
            let session = self.connection.connect().await?;
            let users = session.model(USER_MODEL);
            let ids = users.search(&Domain::new()).await?;
            users.read::<UserSummary>(&ids, UserSummary::FIELDS).await
        }
        .await;
        respond("listing users", result)
    }

    pub async fn get_user_details(&self, user_id: i64) -> Value {
        let result = async {
            let session = self.connection.connect().await?;
            let mut rows = session
                .model(USER_MODEL)
                .read::<UserDetails>(&[user_id], UserDetails::FIELDS)
                .await?;
            Ok::<_, RpcError>(rows.pop())
        }
        .await;

        match result {
            Ok(Some(user)) => to_payload(&user),
            Ok(None) => error_payload(format!("User {} not found", user_id)),
            Err(e) => failure("getting user details", e),
        }
    }

    /// Generic search over an allow-listed model.
    ///
    /// A model outside [`odoo_support_types::SEARCHABLE_MODELS`] is refused
    /// before any connection is attempted.
    pub async fn search_records(
        &self,
        model: &str,
        domain: Vec<Value>,
        fields: Option<&[String]>,
    ) -> Value {
        if !is_searchable_model(model) {
            tracing::warn!(model, "search refused for model outside the allow-list");
            return error_payload(format!("Model '{}' is not available for search", model));
        }

        let result = async {
            let session = self.connection.connect().await?;
            let records = session.model(model);
            let ids = records.search_raw(Value::Array(domain)).await?;
            records.read_raw(&ids, fields).await
        }
        .await;
        respond("searching records", result)
    }

    pub async fn get_database_info(&self) -> Value {
        match self.connection.connect().await {
            Ok(session) => {
                let settings = self.connection.settings();
                json!({
                    "version": session.version(),
                    "database": session.database(),
                    "host": settings.host(),
                    "port": settings.port,
                })
            }
            Err(e) => failure("getting database info", e),
        }
    }

    pub async fn get_company_info(&self) -> Value {
        let result = async {
            let session = self.connection.connect().await?;
            let companies = session.model(COMPANY_MODEL);
            let ids = companies.search(&Domain::new()).await?;
            if ids.is_empty() {
                return Ok(None);
            }
            let rows = companies.read::<Company>(&ids, Company::FIELDS).await?;
            Ok::<_, RpcError>(Some(rows))
        }
        .await;

        match result {
            Ok(Some(companies)) => to_payload(&companies),
            Ok(None) => error_payload("No company found"),
            Err(e) => failure("getting company info", e),
        }
    }

    pub async fn check_module_dependencies(&self, module_name: &str) -> Value {
        let result = async {
            let session = self.connection.connect().await?;
            let Some(id) = find_module(&session, module_name).await? else {
                return Ok(None);
            };
            let dependencies = session.model(DEPENDENCY_MODEL);
            let ids = dependencies
                .search(&Domain::new().eq("module_id", id))
                .await?;
            let rows = dependencies
                .read::<ModuleDependency>(&ids, ModuleDependency::FIELDS)
                .await?;
            Ok::<_, RpcError>(Some(rows))
        }
        .await;

        match result {
            Ok(Some(dependencies)) => json!({
                "module": module_name,
                "dependencies": to_payload(&dependencies),
            }),
            Ok(None) => error_payload(format!("Module {} not found", module_name)),
            Err(e) => failure("checking dependencies", e),
        }
    }
}

async fn find_module(session: &OdooSession, name: &str) -> Result<Option<i64>, RpcError> {
    let ids = session
        .model(MODULE_MODEL)
        .search(&Domain::new().eq("name", name))
        .await?;
    Ok(ids.first().copied())
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, Value> {
    serde_json::from_value(arguments)
        .map_err(|e| error_payload(format!("Invalid arguments for {}: {}", tool, e)))
}

fn to_payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| error_payload(e.to_string()))
}

fn respond<T: Serialize>(action: &str, result: Result<T, RpcError>) -> Value {
    match result {
        Ok(value) => to_payload(&value),
        Err(e) => failure(action, e),
    }
}

fn failure(action: &str, err: RpcError) -> Value {
    tracing::error!(error = %err, "error {}", action);
    error_payload(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_payload_shape() {
        let payload = error_payload("boom");
        assert_eq!(payload, json!({"error": "boom"}));
        assert!(is_error_payload(&payload));
        assert!(!is_error_payload(&json!({"error": "x", "module": "sale"})));
        assert!(!is_error_payload(&json!([])));
    }
}
