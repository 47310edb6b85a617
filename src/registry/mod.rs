//! # Registry Infrastructure
//!
//! Registration and resolution of the executor strategies a transport can
//! route messages through.
//!
//! ## Architecture
//!
//! ```text
//! Registry Infrastructure
//! └── ExecutorRegistry    (ordered candidates, default eviction, single resolution)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use odm_transport::executor::{DefaultExecutor, ExecutorPtr};
//! use odm_transport::registry::ExecutorRegistry;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let default: ExecutorPtr = Arc::new(DefaultExecutor::new());
//! let registry = ExecutorRegistry::from_registrations("default", [("default", default)])?;
//! let resolved = registry.resolve()?;
//! assert_eq!(resolved.id(), "default");
//! # Ok(())
//! # }
//! ```

pub mod executor_registry;

pub use executor_registry::{ExecutorRegistry, ResolvedExecutor};
