use crate::analyze::analyze_error;
use crate::logs::{self, DEFAULT_LOG_LINES, MAX_LOG_LINES};
use odoo_support_rpc::{Domain, OdooConnection, OdooSession, RpcError};
use odoo_support_types::{ModuleSummary, UserDetails};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

const MODULE_MODEL: &str = "ir.module.module";
const USER_MODEL: &str = "res.users";

#[derive(Debug, Deserialize)]
struct ModuleArgs {
    module_name: String,
}

#[derive(Debug, Deserialize)]
struct UserArgs {
    user_identifier: String,
}

#[derive(Debug, Deserialize)]
struct CreateUserArgs {
    name: String,
    login: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct ResetPasswordArgs {
    user_identifier: String,
    new_password: String,
}

fn default_log_lines() -> usize {
    DEFAULT_LOG_LINES
}

#[derive(Debug, Deserialize)]
struct LogArgs {
    #[serde(default = "default_log_lines")]
    lines: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorArgs {
    error_message: String,
}

/// The agent's Odoo tool set.
///
/// Every method returns user-facing text and never fails: remote and I/O
/// errors are reported inside the returned string.
#[derive(Debug, Clone)]
pub struct SupportTools {
    connection: Arc<OdooConnection>,
    log_file: PathBuf,
}

impl SupportTools {
    pub fn new(connection: Arc<OdooConnection>, log_file: impl Into<PathBuf>) -> Self {
        Self {
            connection,
            log_file: log_file.into(),
        }
    }

    pub fn connection(&self) -> &Arc<OdooConnection> {
        &self.connection
    }

    /// Dispatches a model function call by tool name.
    ///
    /// `arguments` is the JSON object the model produced; `null` is treated
    /// as an empty object.
    pub async fn call(&self, name: &str, arguments: Value) -> String {
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments
        };

        tracing::info!(tool = name, "agent tool call");

        match name {
            "check_odoo_status" => self.check_odoo_status().await,
            "get_installed_modules" => self.get_installed_modules().await,
            "install_module" => match parse_args::<ModuleArgs>(name, arguments) {
                Ok(args) => self.install_module(&args.module_name).await,
                Err(msg) => msg,
            },
            "update_module" => match parse_args::<ModuleArgs>(name, arguments) {
                Ok(args) => self.update_module(&args.module_name).await,
                Err(msg) => msg,
            },
            "get_user_info" => match parse_args::<UserArgs>(name, arguments) {
                Ok(args) => self.get_user_info(&args.user_identifier).await,
                Err(msg) => msg,
            },
            "create_user" => match parse_args::<CreateUserArgs>(name, arguments) {
                Ok(args) => {
                    self.create_user(&args.name, &args.login, &args.email, &args.password)
                        .await
                }
                Err(msg) => msg,
            },
            "reset_user_password" => match parse_args::<ResetPasswordArgs>(name, arguments) {
                Ok(args) => {
                    self.reset_user_password(&args.user_identifier, &args.new_password)
                        .await
                }
                Err(msg) => msg,
            },
            "get_server_logs" => match parse_args::<LogArgs>(name, arguments) {
                Ok(args) => self.get_server_logs(args.lines).await,
                Err(msg) => msg,
            },
            "analyze_error" => match parse_args::<ErrorArgs>(name, arguments) {
                Ok(args) => analyze_error(&args.error_message),
                Err(msg) => msg,
            },
            _ => {
                tracing::warn!(tool = name, "unknown agent tool requested");
                format!("Unknown tool: {}", name)
            }
        }
    }

    pub async fn check_odoo_status(&self) -> String {
        match self.connection.connect().await {
            Ok(session) => format!("Odoo instance is running. Version: {}", session.version()),
            Err(e) => format!("Unable to connect to Odoo instance: {}", e),
        }
    }

    pub async fn get_installed_modules(&self) -> String {
        let result = async {
            let session = self.connection.connect().await?;
            let model = session.model(MODULE_MODEL);
            let ids = model
                .search(&Domain::new().eq("state", "installed"))
                .await?;
            model.read::<ModuleSummary>(&ids, ModuleSummary::FIELDS).await
        }
        .await;

        match result {
            Ok(modules) => {
                let mut out = String::from("Installed Modules:\n");
                for module in modules {
                    let _ = writeln!(
                        out,
                        "- {} ({}): v{}",
                        module.name,
                        module.shortdesc.as_deref().unwrap_or(""),
                        module.installed_version.as_deref().unwrap_or("unknown")
                    );
                }
                out
            }
            Err(e) => failure("get_installed_modules", "Error retrieving modules", e),
        }
    }

    pub async fn install_module(&self, module_name: &str) -> String {
        self.module_action(module_name, "button_immediate_install", "installed", "installing")
            .await
    }

    pub async fn update_module(&self, module_name: &str) -> String {
        self.module_action(module_name, "button_immediate_upgrade", "updated", "updating")
            .await
    }

    async fn module_action(
        &self,
        module_name: &str,
        method: &str,
        done: &str,
        doing: &str,
    ) -> String {
        let module_name = module_name.trim();
        if module_name.is_empty() {
            return "Module name must not be empty".to_string();
        }

        let result = async {
            let session = self.connection.connect().await?;
            let model = session.model(MODULE_MODEL);
            let ids = model.search(&Domain::new().eq("name", module_name)).await?;
            if ids.is_empty() {
                return Ok(None);
            }
            model.call(method, &ids).await?;
            Ok::<_, RpcError>(Some(()))
        }
        .await;

        match result {
            Ok(Some(())) => {
                tracing::info!(module = module_name, method, "module action completed");
                format!("Successfully {} module: {}", done, module_name)
            }
            Ok(None) => format!("Module '{}' not found in the system", module_name),
            Err(e) => failure(method, &format!("Error {} module", doing), e),
        }
    }

    pub async fn get_user_info(&self, user_identifier: &str) -> String {
        let user_identifier = user_identifier.trim();
        if user_identifier.is_empty() {
            return "User identifier must not be empty".to_string();
        }

        let result = async {
            let session = self.connection.connect().await?;
            let Some(id) = find_user(&session, user_identifier).await? else {
                return Ok(None);
            };
            let mut rows = session
                .model(USER_MODEL)
                .read::<UserDetails>(&[id], UserDetails::FIELDS)
                .await?;
            Ok::<_, RpcError>(rows.pop())
        }
        .await;

        match result {
            Ok(Some(user)) => format!(
                "User Information:\n\
                 Name: {}\n\
                 Login: {}\n\
                 Email: {}\n\
                 Active: {}\n\
                 Groups: {} groups assigned\n",
                user.name,
                user.login,
                user.email.as_deref().unwrap_or("not set"),
                user.active,
                user.groups_id.len()
            ),
            Ok(None) => format!("User '{}' not found", user_identifier),
            Err(e) => failure("get_user_info", "Error retrieving user info", e),
        }
    }

    pub async fn create_user(&self, name: &str, login: &str, email: &str, password: &str) -> String {
        for (field, value) in [("name", name), ("login", login), ("password", password)] {
            if value.trim().is_empty() {
                return format!("Cannot create user: {} must not be empty", field);
            }
        }

        let result = async {
            let session = self.connection.connect().await?;
            session
                .model(USER_MODEL)
                .create(json!({
                    "name": name,
                    "login": login,
                    "email": email,
                    "password": password,
                }))
                .await
        }
        .await;

        match result {
            Ok(id) => {
                tracing::info!(login, user_id = id, "created Odoo user");
                format!("Successfully created user: {} (ID: {})", name, id)
            }
            Err(e) => failure("create_user", "Error creating user", e),
        }
    }

    pub async fn reset_user_password(&self, user_identifier: &str, new_password: &str) -> String {
        let user_identifier = user_identifier.trim();
        if user_identifier.is_empty() {
            return "User identifier must not be empty".to_string();
        }
        if new_password.is_empty() {
            return "New password must not be empty".to_string();
        }

        let result = async {
            let session = self.connection.connect().await?;
            let Some(id) = find_user(&session, user_identifier).await? else {
                return Ok(false);
            };
            session
                .model(USER_MODEL)
                .write(&[id], json!({ "password": new_password }))
                .await?;
            Ok::<_, RpcError>(true)
        }
        .await;

        match result {
            Ok(true) => {
                tracing::info!(user = user_identifier, "reset Odoo user password");
                format!("Successfully reset password for user: {}", user_identifier)
            }
            Ok(false) => format!("User '{}' not found", user_identifier),
            Err(e) => failure("reset_user_password", "Error resetting password", e),
        }
    }

    /// Returns the last `lines` lines of the Odoo server log, clamped to
    /// `1..=MAX_LOG_LINES`.
    pub async fn get_server_logs(&self, lines: usize) -> String {
        let lines = lines.clamp(1, MAX_LOG_LINES);
        let path = self.log_file.clone();

        let result = tokio::task::spawn_blocking(move || {
            if !path.exists() {
                return Ok(None);
            }
            logs::tail(&path, lines).map(Some)
        })
        .await;

        match result {
            Ok(Ok(Some(text))) => format!("Recent Server Logs:\n{}", text),
            Ok(Ok(None)) => format!("Log file not found at: {}", self.log_file.display()),
            Ok(Err(e)) => format!("Error reading logs: {}", e),
            Err(e) => format!("Error reading logs: task join error: {}", e),
        }
    }

    pub fn analyze_error(&self, error_message: &str) -> String {
        analyze_error(error_message)
    }
}

/// Looks up a user id by login or email.
async fn find_user(session: &OdooSession, identifier: &str) -> Result<Option<i64>, RpcError> {
    let domain = Domain::new()
        .eq("login", identifier)
        .or(Domain::new().eq("email", identifier));
    let ids = session.model(USER_MODEL).search(&domain).await?;
    Ok(ids.first().copied())
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, String> {
    serde_json::from_value(arguments).map_err(|e| format!("Invalid arguments for {}: {}", tool, e))
}

fn failure(operation: &str, prefix: &str, error: RpcError) -> String {
    tracing::error!(operation, "odoo tool failed: {}", error);
    format!("{}: {}", prefix, error)
}
