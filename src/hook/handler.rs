//! Lifecycle hook trait, context and error type.

use async_trait::async_trait;
use thiserror::Error;

/// Suite-level lifecycle events a hook can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    /// Runs once before any test executes.
    BeforeAll,
    /// Runs once after every test has executed.
    AfterAll,
}

impl HookEvent {
    /// Name of the event on the hooks-handler wire protocol.
    pub fn wire_name(&self) -> &'static str {
        match self {
            HookEvent::BeforeAll => "beforeAll",
            HookEvent::AfterAll => "afterAll",
        }
    }

    /// Map a wire event name to a suite-level event.
    ///
    /// Per-transaction events (`beforeEach`, `after`, ...) return `None`.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "beforeAll" => Some(HookEvent::BeforeAll),
            "afterAll" => Some(HookEvent::AfterAll),
            _ => None,
        }
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Execution context handed to every hook invocation.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Event being dispatched.
    pub event: HookEvent,
    /// Identifier of this invocation, for tracing.
    pub invocation_id: String,
}

impl HookContext {
    /// Create a new hook context.
    pub fn new(event: HookEvent, invocation_id: impl Into<String>) -> Self {
        Self {
            event,
            invocation_id: invocation_id.into(),
        }
    }
}

/// A callback the test runner invokes at suite-level lifecycle points.
///
/// Hooks are handed to a [`HookRegistry`](crate::hook::HookRegistry)
/// explicitly; nothing registers itself. Completion is signaled by the
/// returned future resolving, so it happens exactly once per invocation.
#[async_trait]
pub trait LifecycleHook: Send + Sync {
    /// Called before any test executes.
    async fn before_all(&self, ctx: &HookContext) -> Result<(), HookError> {
        let _ = ctx;
        Ok(())
    }

    /// Called after all tests have executed.
    async fn after_all(&self, ctx: &HookContext) -> Result<(), HookError> {
        let _ = ctx;
        Ok(())
    }

    /// Get the hook name.
    fn name(&self) -> &str;
}

/// Errors raised while running hooks.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("failed to read fixture file {path}: {source}")]
    FixtureRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configure endpoint '{uri}': {reason}")]
    InvalidEndpoint { uri: String, reason: String },

    #[error("failed to connect to {uri}: {source}")]
    Connect {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to push fixtures to {uri}: {source}")]
    Push {
        uri: String,
        #[source]
        source: hyper::Error,
    },

    #[error("hook '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("hook '{0}' not found")]
    NotFound(String),

    #[error("hook '{hook}' failed: {message}")]
    Failed { hook: String, message: String },

    #[error("malformed hooks message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HookError {
    /// Create a generic failure for a named hook.
    pub fn failed(hook: impl Into<String>, message: impl Into<String>) -> Self {
        HookError::Failed {
            hook: hook.into(),
            message: message.into(),
        }
    }
}
