//! Executor capability interface and the context bound onto it.

use crate::error::{TransportError, TransportResult};
use crate::messaging::{ExecutorOptions, Message};
use crate::store::DataStorePtr;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Turns a message into the JSON document an executor stores.
pub trait MessageSerializer: Send + Sync {
    fn normalize(&self, message: &Message) -> TransportResult<Value>;
}

pub type SerializerPtr = Arc<dyn MessageSerializer>;

/// Serializer that hands over the message payload as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl MessageSerializer for JsonSerializer {
    fn normalize(&self, message: &Message) -> TransportResult<Value> {
        Ok(serde_json::to_value(&message.payload)?)
    }
}

/// Runtime dependencies bound onto an executor before its first use.
#[derive(Clone)]
pub struct ExecutorContext {
    pub connection_name: String,
    pub handle: DataStorePtr,
    /// Span the executor logs in; scoped to one transport.
    pub span: tracing::Span,
    pub serializer: SerializerPtr,
    pub options: ExecutorOptions,
}

impl fmt::Debug for ExecutorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorContext")
            .field("connection_name", &self.connection_name)
            .field("handle", &self.handle.name())
            .field("options", &self.options)
            .finish()
    }
}

/// Strategy that executes (persists or forwards) one message.
///
/// `configure` may be called again for a new transport; it must not be
/// called concurrently with `execute` on the same instance. The transport
/// factory serializes all `configure` calls it makes.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Bind runtime dependencies. Rejecting the options here keeps the error
    /// at transport creation instead of send time.
    fn configure(&self, context: ExecutorContext) -> TransportResult<()>;

    async fn execute(&self, message: &Message) -> TransportResult<()>;

    /// Fresh, unconfigured instance of the same strategy, used to give each
    /// transport configuration its own executor. `None` means the executor
    /// can only be shared.
    fn fork(&self) -> Option<ExecutorPtr> {
        None
    }
}

pub type ExecutorPtr = Arc<dyn Executor>;

/// Holder for the context of a configurable executor.
#[derive(Debug, Default)]
pub struct ContextSlot {
    context: RwLock<Option<ExecutorContext>>,
}

impl ContextSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, context: ExecutorContext) {
        *self.context.write() = Some(context);
    }

    pub fn get(&self) -> Option<ExecutorContext> {
        self.context.read().clone()
    }

    pub fn is_set(&self) -> bool {
        self.context.read().is_some()
    }

    /// Current context, or `ExecutorNotConfigured` naming `executor_id`.
    pub fn require(&self, executor_id: &str) -> TransportResult<ExecutorContext> {
        self.get()
            .ok_or_else(|| TransportError::executor_not_configured(executor_id))
    }
}
