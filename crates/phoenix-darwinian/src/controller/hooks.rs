//! Integration hooks invoked by the orchestrator
//!
//! Hooks run one after another. A failing hook is logged and skipped; it
//! never aborts the run.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use phoenix_common::{AgentState, HookError, PhoenixEvolutionState};
use tracing::warn;

/// Observer of a run. Both callbacks default to no-ops.
#[async_trait]
pub trait EvolutionHook: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    async fn on_population_initialized(&self, _population: &[AgentState]) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_generation_completed(
        &self,
        _generation: u32,
        _state: &PhoenixEvolutionState,
    ) -> Result<(), HookError> {
        Ok(())
    }
}

/// Ordered set of registered hooks
#[derive(Default)]
pub struct HookRegistry {
    hooks: RwLock<Vec<Arc<dyn EvolutionHook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, hook: Arc<dyn EvolutionHook>) {
        self.hooks.write().push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }

    fn snapshot(&self) -> Vec<Arc<dyn EvolutionHook>> {
        self.hooks.read().clone()
    }

    /// Returns the number of hooks that failed
    pub async fn population_initialized(&self, population: &[AgentState]) -> usize {
        let mut failures = 0;
        for hook in self.snapshot() {
            if let Err(e) = hook.on_population_initialized(population).await {
                warn!(hook = hook.name(), error = %e, "Hook failed after population init");
                failures += 1;
            }
        }
        failures
    }

    /// Returns the number of hooks that failed
    pub async fn generation_completed(&self, generation: u32, state: &PhoenixEvolutionState) -> usize {
        let mut failures = 0;
        for hook in self.snapshot() {
            if let Err(e) = hook.on_generation_completed(generation, state).await {
                warn!(
                    hook = hook.name(),
                    generation,
                    error = %e,
                    "Hook failed after generation"
                );
                failures += 1;
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing;

    #[async_trait]
    impl EvolutionHook for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn on_generation_completed(
            &self,
            _generation: u32,
            _state: &PhoenixEvolutionState,
        ) -> Result<(), HookError> {
            Err(HookError::new("failing", "disk full"))
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EvolutionHook for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn on_generation_completed(
            &self,
            _generation: u32,
            _state: &PhoenixEvolutionState,
        ) -> Result<(), HookError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failing_hook_does_not_stop_others() {
        let counting = Arc::new(Counting::default());
        let registry = HookRegistry::new();
        registry.register(Arc::new(Failing));
        registry.register(counting.clone());

        let state = PhoenixEvolutionState::new(Vec::new());
        assert_eq!(registry.generation_completed(1, &state).await, 1);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_default_callbacks_are_noops() {
        let registry = HookRegistry::new();
        registry.register(Arc::new(Counting::default()));
        assert_eq!(registry.population_initialized(&[]).await, 0);
    }
}
