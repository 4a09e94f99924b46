//! Lifecycle hooks and the registry the test runner is handed explicitly.

pub mod handler;
pub mod registry;

pub use handler::{HookContext, HookError, HookEvent, LifecycleHook};
pub use registry::{HookRegistry, HookState};
