//! Registry of lifecycle hooks, run in registration order.

use crate::hook::handler::{HookContext, HookError, HookEvent, LifecycleHook};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// State of a hook in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    /// Registered, never run.
    Idle,
    /// Currently handling an event.
    Running,
    /// Last invocation completed.
    Completed,
    /// Last invocation failed.
    Failed,
}

/// Hook entry in the registry.
struct HookEntry {
    /// Registration name.
    name: String,
    /// The hook implementation.
    hook: Arc<dyn LifecycleHook>,
    /// Current state of the hook.
    state: HookState,
    /// Number of completed invocations.
    completions: usize,
}

/// Registry of lifecycle hooks.
///
/// The runner owns the registry and decides when events fire; hooks never
/// register themselves.
pub struct HookRegistry {
    hooks: RwLock<Vec<HookEntry>>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// Register a hook under `name`.
    pub async fn register(
        &self,
        name: impl Into<String>,
        hook: Box<dyn LifecycleHook>,
    ) -> Result<(), HookError> {
        let name = name.into();
        let mut hooks = self.hooks.write().await;

        if hooks.iter().any(|entry| entry.name == name) {
            return Err(HookError::AlreadyRegistered(name));
        }

        hooks.push(HookEntry {
            name: name.clone(),
            hook: Arc::from(hook),
            state: HookState::Idle,
            completions: 0,
        });
        info!("Registered hook: {}", name);
        Ok(())
    }

    /// Run every registered hook for `event`, in registration order.
    ///
    /// The first failure stops the event; hooks after it are not invoked.
    pub async fn run(&self, event: HookEvent, invocation_id: &str) -> Result<(), HookError> {
        let targets: Vec<(String, Arc<dyn LifecycleHook>)> = {
            let hooks = self.hooks.read().await;
            hooks
                .iter()
                .map(|entry| (entry.name.clone(), entry.hook.clone()))
                .collect()
        };

        let ctx = HookContext::new(event, invocation_id);
        debug!(
            "Running {} hook(s) for {} [{}]",
            targets.len(),
            event,
            invocation_id
        );

        for (name, hook) in targets {
            self.set_state(&name, HookState::Running).await;

            let result = match event {
                HookEvent::BeforeAll => hook.before_all(&ctx).await,
                HookEvent::AfterAll => hook.after_all(&ctx).await,
            };

            let mut hooks = self.hooks.write().await;
            let entry = hooks.iter_mut().find(|entry| entry.name == name);
            match result {
                Ok(()) => {
                    if let Some(entry) = entry {
                        entry.state = HookState::Completed;
                        entry.completions += 1;
                    }
                    debug!("Hook '{}' completed {} [{}]", name, event, invocation_id);
                }
                Err(e) => {
                    if let Some(entry) = entry {
                        entry.state = HookState::Failed;
                    }
                    error!("Hook '{}' failed during {}: {}", name, event, e);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    async fn set_state(&self, name: &str, state: HookState) {
        let mut hooks = self.hooks.write().await;
        if let Some(entry) = hooks.iter_mut().find(|entry| entry.name == name) {
            entry.state = state;
        }
    }

    /// Get the state of a hook.
    pub async fn get_state(&self, name: &str) -> Option<HookState> {
        let hooks = self.hooks.read().await;
        hooks.iter().find(|e| e.name == name).map(|e| e.state)
    }

    /// Number of invocations of a hook that completed successfully.
    pub async fn completions(&self, name: &str) -> Option<usize> {
        let hooks = self.hooks.read().await;
        hooks.iter().find(|e| e.name == name).map(|e| e.completions)
    }

    /// List all registered hooks in registration order.
    pub async fn list(&self) -> Vec<(String, HookState)> {
        let hooks = self.hooks.read().await;
        hooks.iter().map(|e| (e.name.clone(), e.state)).collect()
    }

    /// Remove a hook from the registry.
    pub async fn remove(&self, name: &str) -> Result<(), HookError> {
        let mut hooks = self.hooks.write().await;
        let index = hooks
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| HookError::NotFound(name.to_string()))?;
        hooks.remove(index);

        info!("Removed hook: {}", name);
        Ok(())
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
