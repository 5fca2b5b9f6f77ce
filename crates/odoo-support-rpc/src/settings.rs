use serde::Deserialize;
use std::fmt;

/// Host used when none is configured.
pub const DEFAULT_ODOO_HOST: &str = "localhost";

fn default_port() -> u16 {
    8069
}

fn default_database() -> String {
    "odoo".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "admin".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// Connection parameters for the remote Odoo server.
#[derive(Clone, Deserialize)]
pub struct OdooSettings {
    /// Odoo host. `None` means "not configured"; connections then target
    /// [`DEFAULT_ODOO_HOST`].
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Per-request timeout in seconds. Module installs and upgrades run
    /// inside a single request, so this stays generous.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OdooSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            database: default_database(),
            username: default_username(),
            password: default_password(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for OdooSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdooSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OdooSettings {
    /// Reads `ODOO_HOST`, `ODOO_PORT`, `ODOO_DB`, `ODOO_USERNAME`,
    /// `ODOO_PASSWORD` and `ODOO_TIMEOUT`, keeping defaults for anything
    /// unset or unparsable.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env();
        settings
    }

    /// Applies the `ODOO_*` environment overrides on top of `self`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("ODOO_HOST") {
            if !host.trim().is_empty() {
                self.host = Some(host);
            }
        }
        if let Some(port) = var("ODOO_PORT") {
            match port.parse() {
                Ok(parsed) => self.port = parsed,
                Err(_) => tracing::warn!(value = %port, "ignoring unparsable ODOO_PORT"),
            }
        }
        if let Some(db) = var("ODOO_DB") {
            self.database = db;
        }
        if let Some(username) = var("ODOO_USERNAME") {
            self.username = username;
        }
        if let Some(password) = var("ODOO_PASSWORD") {
            self.password = password;
        }
        if let Some(timeout) = var("ODOO_TIMEOUT") {
            match timeout.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => tracing::warn!(value = %timeout, "ignoring invalid ODOO_TIMEOUT"),
            }
        }
    }

    /// Whether a host was explicitly configured.
    pub fn is_configured(&self) -> bool {
        self.host.as_deref().is_some_and(|h| !h.trim().is_empty())
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_ODOO_HOST)
    }

    /// Base URL of the server. A host that already carries a scheme is
    /// used as-is; a bare host gets `http://`.
    pub fn base_url(&self) -> String {
        let host = self.host().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}:{}", host, self.port)
        } else {
            format!("http://{}:{}", host, self.port)
        }
    }
}
