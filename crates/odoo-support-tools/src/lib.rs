//! Odoo support tools for the voice agent.
//!
//! Nine one-shot operations the speech model can call: status check, module
//! listing/installation/upgrade, user lookup/creation/password reset, server
//! log tail, and error-message analysis. Every operation returns text meant
//! to be read back to the user. Failures are folded into that text, so a
//! tool call never aborts the conversation.

mod analyze;
mod catalog;
mod logs;
mod tools;

pub use analyze::{analyze_error, ERROR_PATTERNS, NO_PATTERN_MATCHED};
pub use catalog::{tool_definitions, TOOL_NAMES};
pub use logs::{DEFAULT_LOG_FILE, DEFAULT_LOG_LINES, MAX_LOG_LINES};
pub use tools::SupportTools;
