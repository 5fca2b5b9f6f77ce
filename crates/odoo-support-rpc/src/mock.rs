//! In-memory [`Transport`] for tests.

use crate::error::RpcError;
use crate::transport::Transport;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

/// A call observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub service: String,
    pub method: String,
    pub args: Value,
}

type Handler = dyn Fn(&str, &str, &Value) -> Result<Value, RpcError> + Send + Sync;

/// Answers every call through a closure and records what it was asked.
pub struct MockTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// uid returned by the login of [`MockTransport::odoo`].
    pub const UID: i64 = 2;
    /// Version string returned by [`MockTransport::odoo`].
    pub const VERSION: &'static str = "17.0";

    /// Raw handler over `(service, method, args)`.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &str, &Value) -> Result<Value, RpcError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A server whose `common` service always succeeds; `object.execute_kw`
    /// calls are unpacked into `(model, method, args, kwargs)` for `handler`.
    pub fn odoo<F>(handler: F) -> Self
    where
        F: Fn(&str, &str, &Value, &Value) -> Result<Value, RpcError> + Send + Sync + 'static,
    {
        Self::new(move |service, method, args| match (service, method) {
            ("common", "version") => Ok(json!({ "server_version": Self::VERSION })),
            ("common", "login") => Ok(json!(Self::UID)),
            ("object", "execute_kw") => {
                let model = args[3].as_str().unwrap_or_default();
                let method = args[4].as_str().unwrap_or_default();
                let kwargs = args.get(6).cloned().unwrap_or_else(|| json!({}));
                handler(model, method, &args[5], &kwargs)
            }
            _ => Err(RpcError::UnexpectedResponse(format!(
                "unmocked call {service}.{method}"
            ))),
        })
    }

    /// A server that refuses every call with `message`.
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |_, _, _| {
            Err(RpcError::Remote {
                code: 200,
                name: "odoo.exceptions.AccessDenied".to_string(),
                message: message.clone(),
            })
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Recorded `object.execute_kw` calls as `(model, method)` pairs.
    pub fn object_calls(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter(|c| c.service == "object")
            .map(|c| {
                (
                    c.args[3].as_str().unwrap_or_default().to_string(),
                    c.args[4].as_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, service: &str, method: &str, args: Value) -> Result<Value, RpcError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                service: service.to_string(),
                method: method.to_string(),
                args: args.clone(),
            });
        }
        (self.handler)(service, method, &args)
    }
}
