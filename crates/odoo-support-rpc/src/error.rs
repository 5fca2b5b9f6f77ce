use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a JSON-RPC `error` member.
    #[error("{name}: {message}")]
    Remote {
        code: i64,
        name: String,
        message: String,
    },

    #[error("authentication failed for user '{username}' on database '{database}'")]
    AuthenticationFailed { database: String, username: String },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RpcError {
    /// Builds a [`RpcError::Remote`] from an Odoo JSON-RPC error object.
    ///
    /// Odoo nests the useful part under `data`:
    /// `{"code": 200, "message": "Odoo Server Error", "data": {"name": ..., "message": ...}}`.
    pub fn from_error_object(error: &serde_json::Value) -> Self {
        let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
        let data = error.get("data");
        let name = data
            .and_then(|d| d.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or("odoo.error")
            .to_string();
        let message = data
            .and_then(|d| d.get("message"))
            .and_then(|m| m.as_str())
            .or_else(|| error.get("message").and_then(|m| m.as_str()))
            .unwrap_or("unknown remote error")
            .to_string();

        RpcError::Remote {
            code,
            name,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn remote_error_prefers_nested_data() {
        let err = RpcError::from_error_object(&json!({
            "code": 200,
            "message": "Odoo Server Error",
            "data": {
                "name": "odoo.exceptions.AccessDenied",
                "message": "Access Denied",
                "debug": "Traceback ..."
            }
        }));

        assert_eq!(err.to_string(), "odoo.exceptions.AccessDenied: Access Denied");
    }

    #[test]
    fn remote_error_falls_back_to_top_level_message() {
        let err = RpcError::from_error_object(&json!({"code": 404, "message": "Not Found"}));
        match err {
            RpcError::Remote { code, name, message } => {
                assert_eq!(code, 404);
                assert_eq!(name, "odoo.error");
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
