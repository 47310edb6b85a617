//! # Executor Registry
//!
//! Ordered collection of candidate executors, built once at startup from the
//! `(id, executor)` pairs supplied by the host application.
//!
//! ## Resolution
//!
//! - no candidates: [`TransportError::NoExecutorRegistered`]
//! - one candidate: that candidate, whatever its id
//! - several candidates: the default executor is evicted and the first
//!   remaining candidate in registration order wins
//!
//! ```rust
//! use odm_transport::executor::DefaultExecutor;
//! use odm_transport::registry::ExecutorRegistry;
//! use std::sync::Arc;
//!
//! let mut registry = ExecutorRegistry::new("default");
//! registry.register("default", Arc::new(DefaultExecutor::new())).unwrap();
//! registry.register("audit", Arc::new(DefaultExecutor::new())).unwrap();
//!
//! assert_eq!(registry.resolve().unwrap().id(), "audit");
//! ```

use crate::config::TransportConfig;
use crate::error::{TransportError, TransportResult};
use crate::executor::ExecutorPtr;
use crate::logging::log_registry_operation;
use std::fmt;
use tracing::debug;

/// The executor selected by [`ExecutorRegistry::resolve`].
#[derive(Clone)]
pub struct ResolvedExecutor {
    id: String,
    executor: ExecutorPtr,
}

impl ResolvedExecutor {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn executor(&self) -> &ExecutorPtr {
        &self.executor
    }
}

impl fmt::Debug for ResolvedExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedExecutor")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

pub struct ExecutorRegistry {
    /// Candidates in registration order
    executors: Vec<(String, ExecutorPtr)>,
    default_executor_id: String,
}

impl ExecutorRegistry {
    pub fn new(default_executor_id: impl Into<String>) -> Self {
        Self {
            executors: Vec::new(),
            default_executor_id: default_executor_id.into(),
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(config.default_executor_id.clone())
    }

    /// Build a registry from pairs, keeping their order.
    pub fn from_registrations<I, S>(
        default_executor_id: impl Into<String>,
        registrations: I,
    ) -> TransportResult<Self>
    where
        I: IntoIterator<Item = (S, ExecutorPtr)>,
        S: Into<String>,
    {
        let mut registry = Self::new(default_executor_id);
        for (id, executor) in registrations {
            registry.register(id, executor)?;
        }
        Ok(registry)
    }

    /// Register an executor. Ids must be unique.
    pub fn register(&mut self, id: impl Into<String>, executor: ExecutorPtr) -> TransportResult<()> {
        let id = id.into();
        if self.executors.iter().any(|(existing, _)| *existing == id) {
            return Err(TransportError::duplicate_executor(id));
        }

        log_registry_operation("register", &id, "success", None);
        self.executors.push((id, executor));
        Ok(())
    }

    pub fn default_executor_id(&self) -> &str {
        &self.default_executor_id
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<&str> {
        self.executors.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }

    /// Select the single active executor.
    pub fn resolve(&self) -> TransportResult<ResolvedExecutor> {
        let (id, executor) = match self.executors.as_slice() {
            [] => return Err(TransportError::NoExecutorRegistered),
            [only] => only,
            candidates => candidates
                .iter()
                .find(|(id, _)| *id != self.default_executor_id)
                .ok_or_else(|| {
                    TransportError::configuration(
                        "ExecutorRegistry",
                        format!(
                            "no executor left after evicting default '{}'",
                            self.default_executor_id
                        ),
                    )
                })?,
        };

        debug!(
            executor_id = %id,
            candidates = self.executors.len(),
            "Resolved active executor"
        );
        log_registry_operation("resolve", id, "success", None);

        Ok(ResolvedExecutor {
            id: id.clone(),
            executor: executor.clone(),
        })
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("executors", &self.ids())
            .field("default_executor_id", &self.default_executor_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Executor, ExecutorContext};
    use crate::messaging::Message;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Noop;

    #[async_trait]
    impl Executor for Noop {
        fn configure(&self, _: ExecutorContext) -> TransportResult<()> {
            Ok(())
        }

        async fn execute(&self, _: &Message) -> TransportResult<()> {
            Ok(())
        }
    }

    fn noop() -> ExecutorPtr {
        Arc::new(Noop)
    }

    #[test]
    fn test_empty_registry_fails() {
        let registry = ExecutorRegistry::new("default");
        assert!(matches!(
            registry.resolve(),
            Err(TransportError::NoExecutorRegistered)
        ));
    }

    #[test]
    fn test_single_default_is_kept() {
        let registry =
            ExecutorRegistry::from_registrations("default", [("default", noop())]).unwrap();
        assert_eq!(registry.resolve().unwrap().id(), "default");
    }

    #[test]
    fn test_single_custom_is_returned() {
        let registry =
            ExecutorRegistry::from_registrations("default", [("custom", noop())]).unwrap();
        assert_eq!(registry.resolve().unwrap().id(), "custom");
    }

    #[test]
    fn test_default_yields_to_custom() {
        let registry = ExecutorRegistry::from_registrations(
            "default",
            [("default", noop()), ("custom", noop())],
        )
        .unwrap();
        assert_eq!(registry.resolve().unwrap().id(), "custom");
    }

    #[test]
    fn test_first_custom_wins() {
        let registry = ExecutorRegistry::from_registrations(
            "default",
            [("beta", noop()), ("default", noop()), ("alpha", noop())],
        )
        .unwrap();
        assert_eq!(registry.resolve().unwrap().id(), "beta");
    }

    #[test]
    fn test_resolve_returns_registered_instance() {
        let custom = noop();
        let registry = ExecutorRegistry::from_registrations(
            "default",
            [("default", noop()), ("custom", custom.clone())],
        )
        .unwrap();
        let resolved = registry.resolve().unwrap();
        assert!(Arc::ptr_eq(resolved.executor(), &custom));
    }

    #[test]
    fn test_default_id_is_configurable() {
        let registry = ExecutorRegistry::from_registrations(
            "fallback",
            [("fallback", noop()), ("default", noop())],
        )
        .unwrap();
        assert_eq!(registry.resolve().unwrap().id(), "default");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = ExecutorRegistry::new("default");
        registry.register("custom", noop()).unwrap();
        assert!(matches!(
            registry.register("custom", noop()),
            Err(TransportError::DuplicateExecutor { .. })
        ));
        assert_eq!(registry.ids(), vec!["custom"]);
    }
}
