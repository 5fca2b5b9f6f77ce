//! RPC access to the remote Odoo server.
//!
//! Speaks Odoo's JSON-RPC endpoint (`/jsonrpc`): the `common` service for
//! version and login, the `object` service (`execute_kw`) for everything
//! else. The crate is layered bottom-up:
//!
//! - [`Transport`]: one request/response round trip. [`HttpTransport`] is
//!   the production implementation; tests substitute an in-memory one.
//! - [`OdooSession`]: an authenticated handle (uid + credentials) with
//!   typed [`Model`] accessors for `search`, `read`, `write`, `create`.
//! - [`OdooConnection`]: the process-wide connection manager. It logs in on
//!   first use, caches the session, and drops it on `disconnect`.
//!
//! There is no retry, backoff, or pooling. A failed call fails the one
//! operation that issued it.

mod connection;
mod domain;
mod error;
mod session;
mod settings;
mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use connection::OdooConnection;
pub use domain::Domain;
pub use error::RpcError;
pub use session::{Model, OdooSession};
pub use settings::{OdooSettings, DEFAULT_ODOO_HOST};
pub use transport::{HttpTransport, Transport};
