//! # ersatz-hooks - fixture hooks for API contract tests
//!
//! Before a contract test suite runs, the mock ("ersatz") server it tests
//! against needs its canned responses. This crate provides a "before all"
//! lifecycle hook that reads a YAML fixture file and posts it, unparsed, to
//! the mock server's configuration endpoint, then waits for the server to
//! apply it.
//!
//! ```text
//!  test runner ──(hooks protocol)──▶ HooksServer ──▶ HookRegistry
//!                                                       │ beforeAll
//!                                                       ▼
//!         ./_ft/ersatz-fixtures.yml ──▶ FixtureHook ──POST /__configure──▶ mock server
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ersatz_hooks::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let registry = HookRegistry::new();
//!     registry
//!         .register("fixtures", Box::new(FixtureHook::new(FixtureConfig::default())))
//!         .await?;
//!
//!     // Either fire the event directly...
//!     registry.run(HookEvent::BeforeAll, "local").await?;
//!
//!     // ...or let the test runner drive it.
//!     HooksServer::new(ServerConfig::default(), Arc::new(registry))
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Failure handling
//!
//! - A missing fixture file is not an error: the hook logs
//!   `No fixtures found, skipping hook.` and completes immediately.
//! - A fixture file that cannot be read is fatal.
//! - A request that cannot be delivered is fatal unless the hook is
//!   configured with [`PushFailurePolicy::Continue`](fixture::PushFailurePolicy).
//! - The response is never awaited: completion comes the settle delay after
//!   dispatch, and the status is logged if it arrived by then.

pub mod fixture;
pub mod hook;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::fixture::{FixtureConfig, FixtureHook, PushFailurePolicy, PushOutcome};
    pub use crate::hook::{HookContext, HookError, HookEvent, HookRegistry, LifecycleHook};
    pub use crate::runtime::{HooksServer, ServerConfig};
    pub use async_trait::async_trait;
}

// Re-export for convenience
pub use fixture::{FixtureConfig, FixtureHook, PushOutcome};
pub use hook::{HookError, HookEvent, HookRegistry, LifecycleHook};
pub use runtime::{HooksServer, ServerConfig};
