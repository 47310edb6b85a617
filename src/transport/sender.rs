//! # Sender
//!
//! Stateless forwarding of messages to one configured executor. Failures
//! raised by the executor are returned to the caller untouched: retry and
//! backpressure belong to the messaging layer above.

use crate::error::TransportResult;
use crate::executor::ExecutorPtr;
use crate::messaging::Message;
use tracing::debug;

#[derive(Clone)]
pub struct Sender {
    executor_id: String,
    executor: ExecutorPtr,
}

impl Sender {
    pub fn new(executor_id: impl Into<String>, executor: ExecutorPtr) -> Self {
        Self {
            executor_id: executor_id.into(),
            executor,
        }
    }

    pub fn executor_id(&self) -> &str {
        &self.executor_id
    }

    /// Sends the message to the executor.
    pub async fn send(&self, message: &Message) -> TransportResult<()> {
        debug!(
            executor_id = %self.executor_id,
            message_id = %message.message_id,
            "Forwarding message to executor"
        );
        self.executor.execute(message).await
    }
}

impl std::fmt::Debug for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender")
            .field("executor_id", &self.executor_id)
            .finish_non_exhaustive()
    }
}

/// Builds senders bound to a configured executor.
pub struct SenderFactory {
    executor_id: String,
    executor: ExecutorPtr,
}

impl SenderFactory {
    pub fn new(executor_id: impl Into<String>, executor: ExecutorPtr) -> Self {
        Self {
            executor_id: executor_id.into(),
            executor,
        }
    }

    pub fn create_sender(&self) -> Sender {
        Sender::new(self.executor_id.clone(), self.executor.clone())
    }
}
