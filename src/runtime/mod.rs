//! Hooks handler runtime: the wire protocol and the server the test runner connects to.

mod config;
pub mod protocol;
mod server;

pub use config::{ServerConfig, DEFAULT_HANDLER_PORT};
pub use protocol::HookMessage;
pub use server::{serve_connection, HooksServer};
