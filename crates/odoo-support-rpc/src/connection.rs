use crate::error::RpcError;
use crate::session::OdooSession;
use crate::settings::OdooSettings;
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Process-wide connection manager for the remote Odoo server.
///
/// Holds at most one authenticated [`OdooSession`]. The session is created
/// by the first [`connect`](Self::connect) and reused until
/// [`disconnect`](Self::disconnect). The lock is held across login, so
/// concurrent first callers share a single login instead of racing.
pub struct OdooConnection {
    settings: OdooSettings,
    transport: Arc<dyn Transport>,
    session: Mutex<Option<Arc<OdooSession>>>,
}

impl std::fmt::Debug for OdooConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdooConnection")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl OdooConnection {
    /// Creates a manager that talks to the configured server over HTTP.
    /// No network traffic happens until the first `connect`.
    pub fn new(settings: OdooSettings) -> Result<Self, RpcError> {
        let transport = HttpTransport::new(&settings)?;
        Ok(Self::with_transport(settings, Arc::new(transport)))
    }

    pub fn with_transport(settings: OdooSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
            session: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &OdooSettings {
        &self.settings
    }

    /// Returns the live session, logging in first if there is none.
    ///
    /// # Errors
    ///
    /// Propagates any transport, remote, or authentication failure. A failed
    /// login leaves the manager disconnected.
    pub async fn connect(&self) -> Result<Arc<OdooSession>, RpcError> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }

        let session = match OdooSession::login(self.transport.clone(), &self.settings).await {
            Ok(session) => Arc::new(session),
            Err(e) => {
                tracing::error!(
                    host = self.settings.host(),
                    port = self.settings.port,
                    "failed to connect to Odoo: {}",
                    e
                );
                return Err(e);
            }
        };

        tracing::info!(
            host = self.settings.host(),
            port = self.settings.port,
            database = %self.settings.database,
            version = session.version(),
            "connected to Odoo"
        );

        *guard = Some(session.clone());
        Ok(session)
    }

    /// Drops the cached session. Calling it while disconnected is a no-op.
    pub async fn disconnect(&self) {
        if self.session.lock().await.take().is_some() {
            tracing::info!(host = self.settings.host(), "disconnected from Odoo");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use serde_json::{json, Value};

    fn manager(transport: Arc<MockTransport>) -> OdooConnection {
        OdooConnection::with_transport(OdooSettings::default(), transport)
    }

    fn login_count(transport: &MockTransport) -> usize {
        transport
            .calls()
            .iter()
            .filter(|c| c.method == "login")
            .count()
    }

    #[tokio::test]
    async fn connect_logs_in_once_and_caches() {
        let transport = Arc::new(MockTransport::odoo(|_, _, _, _| Ok(Value::Null)));
        let conn = manager(transport.clone());

        assert!(!conn.is_connected().await);
        let first = conn.connect().await.unwrap();
        let second = conn.connect().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(login_count(&transport), 1);
        assert!(conn.is_connected().await);
    }

    #[tokio::test]
    async fn disconnect_forces_fresh_login() {
        let transport = Arc::new(MockTransport::odoo(|_, _, _, _| Ok(Value::Null)));
        let conn = manager(transport.clone());

        conn.connect().await.unwrap();
        conn.disconnect().await;
        assert!(!conn.is_connected().await);
        conn.disconnect().await;

        conn.connect().await.unwrap();
        assert_eq!(login_count(&transport), 2);
    }

    #[tokio::test]
    async fn failed_login_is_not_cached() {
        let transport = Arc::new(MockTransport::new(|_, method, _| match method {
            "version" => Ok(json!({"server_version": "16.0"})),
            _ => Ok(json!(false)),
        }));
        let conn = manager(transport.clone());

        assert!(conn.connect().await.is_err());
        assert!(!conn.is_connected().await);
        assert!(conn.connect().await.is_err());
        assert_eq!(login_count(&transport), 2);
    }

    #[tokio::test]
    async fn concurrent_first_connects_share_one_login() {
        let transport = Arc::new(MockTransport::odoo(|_, _, _, _| Ok(Value::Null)));
        let conn = Arc::new(manager(transport.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let conn = conn.clone();
                tokio::spawn(async move { conn.connect().await.map(|_| ()) })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(login_count(&transport), 1);
    }
}
