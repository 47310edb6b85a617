//! # Executors
//!
//! Pluggable strategies that execute outbound messages against a data store.
//!
//! ```text
//! Executor Infrastructure
//! ├── Executor / ExecutorPtr      (capability interface)
//! ├── ExecutorContext             (handle + span + serializer + options)
//! ├── ExecutorConfigurator        (binds a context onto an executor)
//! └── DefaultExecutor             (fallback strategy, yields to custom ones)
//! ```

pub mod configurator;
pub mod default_executor;
pub mod traits;

pub use configurator::ExecutorConfigurator;
pub use default_executor::{DefaultExecutor, EntityPlan, NullableFields};
pub use traits::{
    ContextSlot, Executor, ExecutorContext, ExecutorPtr, JsonSerializer, MessageSerializer,
    SerializerPtr,
};
