use crate::domain::Domain;
use crate::error::RpcError;
use crate::settings::OdooSettings;
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

/// An authenticated connection to one Odoo database.
pub struct OdooSession {
    transport: Arc<dyn Transport>,
    database: String,
    uid: i64,
    password: String,
    server_version: String,
}

impl fmt::Debug for OdooSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdooSession")
            .field("database", &self.database)
            .field("uid", &self.uid)
            .field("server_version", &self.server_version)
            .finish_non_exhaustive()
    }
}

impl OdooSession {
    /// Fetches the server version and logs in with the configured
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::AuthenticationFailed`] when Odoo answers the login
    /// with `false`, or any transport/remote error from either call.
    pub async fn login(
        transport: Arc<dyn Transport>,
        settings: &OdooSettings,
    ) -> Result<Self, RpcError> {
        let version = transport.call("common", "version", json!([])).await?;
        let server_version = version
            .get("server_version")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let uid = transport
            .call(
                "common",
                "login",
                json!([settings.database, settings.username, settings.password]),
            )
            .await?;

        let uid = uid.as_i64().ok_or_else(|| RpcError::AuthenticationFailed {
            database: settings.database.clone(),
            username: settings.username.clone(),
        })?;

        Ok(Self {
            transport,
            database: settings.database.clone(),
            uid,
            password: settings.password.clone(),
            server_version,
        })
    }

    pub fn uid(&self) -> i64 {
        self.uid
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Version string reported by the server at login (e.g. "17.0").
    pub fn version(&self) -> &str {
        &self.server_version
    }

    /// Calls `method` on `model` through `object.execute_kw`.
    pub async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, RpcError> {
        self.transport
            .call(
                "object",
                "execute_kw",
                json!([self.database, self.uid, self.password, model, method, args, kwargs]),
            )
            .await
    }

    /// Returns a handle for issuing calls against `model`.
    pub fn model<'a>(&'a self, model: &'a str) -> Model<'a> {
        Model {
            session: self,
            name: model,
        }
    }
}

/// Calls scoped to one Odoo model (e.g. `res.users`).
#[derive(Debug, Clone, Copy)]
pub struct Model<'a> {
    session: &'a OdooSession,
    name: &'a str,
}

impl Model<'_> {
    pub fn name(&self) -> &str {
        self.name
    }

    /// Returns the ids of records matching `domain`.
    pub async fn search(&self, domain: &Domain) -> Result<Vec<i64>, RpcError> {
        self.search_raw(domain.clone().into()).await
    }

    /// Like [`Model::search`] with a caller-supplied domain value.
    pub async fn search_raw(&self, domain: Value) -> Result<Vec<i64>, RpcError> {
        let ids = self
            .session
            .execute_kw(self.name, "search", json!([domain]), json!({}))
            .await?;
        Ok(serde_json::from_value(ids)?)
    }

    /// Reads `fields` of `ids`, deserializing each row into `T`.
    pub async fn read<T: DeserializeOwned>(
        &self,
        ids: &[i64],
        fields: &[&str],
    ) -> Result<Vec<T>, RpcError> {
        let rows = self
            .session
            .execute_kw(self.name, "read", json!([ids]), json!({ "fields": fields }))
            .await?;
        Ok(serde_json::from_value(rows)?)
    }

    /// Reads rows as raw JSON. `None` fields reads every field.
    pub async fn read_raw(
        &self,
        ids: &[i64],
        fields: Option<&[String]>,
    ) -> Result<Vec<Value>, RpcError> {
        let kwargs = match fields {
            Some(fields) => json!({ "fields": fields }),
            None => json!({}),
        };
        let rows = self
            .session
            .execute_kw(self.name, "read", json!([ids]), kwargs)
            .await?;
        match rows {
            Value::Array(rows) => Ok(rows),
            other => Err(RpcError::UnexpectedResponse(format!(
                "read on {} returned {}",
                self.name, other
            ))),
        }
    }

    /// Writes `values` to every record in `ids`.
    pub async fn write(&self, ids: &[i64], values: Value) -> Result<bool, RpcError> {
        let result = self
            .session
            .execute_kw(self.name, "write", json!([ids, values]), json!({}))
            .await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    /// Creates one record and returns its id.
    pub async fn create(&self, values: Value) -> Result<i64, RpcError> {
        let result = self
            .session
            .execute_kw(self.name, "create", json!([values]), json!({}))
            .await?;
        // Newer servers may answer a single-record create with `[id]`.
        let id = match &result {
            Value::Number(n) => n.as_i64(),
            Value::Array(items) if items.len() == 1 => items[0].as_i64(),
            _ => None,
        };
        id.ok_or_else(|| {
            RpcError::UnexpectedResponse(format!("create on {} returned {}", self.name, result))
        })
    }

    /// Calls a record method such as `button_immediate_install` on `ids`.
    pub async fn call(&self, method: &str, ids: &[i64]) -> Result<Value, RpcError> {
        self.session
            .execute_kw(self.name, method, json!([ids]), json!({}))
            .await
    }
}
