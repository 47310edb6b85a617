//! One-shot binder of runtime dependencies onto an executor.

use super::traits::{Executor, ExecutorContext, SerializerPtr};
use crate::error::TransportResult;
use crate::messaging::ExecutorOptions;
use crate::store::DataStorePtr;
use tracing::debug;

pub struct ExecutorConfigurator {
    context: ExecutorContext,
}

impl ExecutorConfigurator {
    pub fn new(
        connection_name: impl Into<String>,
        handle: DataStorePtr,
        span: tracing::Span,
        serializer: SerializerPtr,
        options: ExecutorOptions,
    ) -> Self {
        Self {
            context: ExecutorContext {
                connection_name: connection_name.into(),
                handle,
                span,
                serializer,
                options,
            },
        }
    }

    pub fn context(&self) -> &ExecutorContext {
        &self.context
    }

    /// Bind the context onto `executor`. Callers must not run this
    /// concurrently with `execute` on the same executor.
    pub fn configure(&self, executor: &dyn Executor) -> TransportResult<()> {
        debug!(
            connection_name = %self.context.connection_name,
            options = %self.context.options.fingerprint(),
            "Configuring executor"
        );
        executor.configure(self.context.clone())
    }
}
