use crate::error::RpcError;
use crate::settings::OdooSettings;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// One JSON-RPC round trip to an Odoo service.
///
/// `service` is `common` or `object`; `args` is the positional argument
/// array passed to the service method.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, service: &str, method: &str, args: Value) -> Result<Value, RpcError>;
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// [`Transport`] over Odoo's `/jsonrpc` HTTP endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(settings: &OdooSettings) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: format!("{}/jsonrpc", settings.base_url()),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, service: &str, method: &str, args: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": {
                "service": service,
                "method": method,
                "args": args,
            },
            "id": id,
        });

        tracing::debug!(service, method, id, "odoo rpc call");

        let response: JsonRpcResponse = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(RpcError::from_error_object(&error));
        }

        // `null` is a legitimate result (e.g. a method returning None).
        Ok(response.result.unwrap_or(Value::Null))
    }
}
