//! Server configuration loading from file and environment variables.

use odoo_support_rpc::OdooSettings;
use odoo_support_voice::LiveKitConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Browser origins allowed to call the API.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// LiveKit credentials for token issuance and room creation.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// Remote Odoo server.
    #[serde(default)]
    pub odoo: OdooSettings,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_origins")]
    pub origins: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "odoo_support_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8000
}

fn default_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_origins(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Splits a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Applies environment variable overrides:
    /// - `HOST` / `PORT` override `server.host` / `server.port`
    /// - `CORS_ORIGINS` (comma-separated) overrides `cors.origins`
    /// - `SUPPORT_LOG_LEVEL` overrides `logging.level`
    /// - `SUPPORT_LOG_JSON` overrides `logging.json` (set to "true" to enable)
    /// - `LIVEKIT_*` and `ODOO_*` override the `livekit` and `odoo` sections
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("HOST") {
            if let Ok(parsed) = host.parse() {
                self.server.host = parsed;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(parsed) = port.parse() {
                self.server.port = parsed;
            }
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            self.cors.origins = parse_origins(&origins);
        }
        if let Ok(level) = std::env::var("SUPPORT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json) = std::env::var("SUPPORT_LOG_JSON") {
            self.logging.json = json == "true" || json == "1";
        }
        self.livekit.apply_env();
        self.odoo.apply_env();
    }
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides (see [`Config::apply_env`]).
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    config.apply_env();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.cors.origins, vec!["http://localhost:3000"]);
        assert_eq!(config.logging.level, "info");
        assert!(!config.livekit.is_configured());
        assert!(!config.odoo.is_configured());
    }

    #[test]
    fn parses_all_sections() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [cors]
            origins = ["https://support.example.com"]

            [logging]
            level = "debug"
            json = true

            [livekit]
            url = "wss://lk.example.com"
            api_key = "key"
            api_secret = "secret"

            [odoo]
            host = "odoo.internal"
            database = "prod"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.cors.origins, vec!["https://support.example.com"]);
        assert!(config.logging.json);
        assert!(config.livekit.is_configured());
        assert_eq!(config.odoo.host.as_deref(), Some("odoo.internal"));
        assert_eq!(config.odoo.port, 8069);
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins("http://a.test, https://b.test ,,"),
            vec!["http://a.test", "https://b.test"]
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();

        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_uses_defaults() {
        assert!(load_config(Some("/nonexistent/odoo-support.toml")).is_ok());
    }
}
