//! The composed transport handed to the messaging layer.

use super::sender::Sender;
use crate::error::TransportResult;
use crate::messaging::{ConnectionDescriptor, Message};
use tracing::Instrument;

/// Transport bound to one connection and one configured executor.
///
/// Built only by [`TransportFactory`](super::TransportFactory), so a value of
/// this type always wraps a configured executor.
#[derive(Debug)]
pub struct OdmTransport {
    name: Option<String>,
    connection: ConnectionDescriptor,
    sender: Sender,
    span: tracing::Span,
}

impl OdmTransport {
    pub(crate) fn new(
        name: Option<String>,
        connection: ConnectionDescriptor,
        sender: Sender,
        span: tracing::Span,
    ) -> Self {
        Self {
            name,
            connection,
            sender,
            span,
        }
    }

    /// Value of the `transport_name` option, when one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn connection(&self) -> &ConnectionDescriptor {
        &self.connection
    }

    pub fn executor_id(&self) -> &str {
        self.sender.executor_id()
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    /// Forward a message through the sender. Messages are executed in call
    /// order; errors from the executor are returned unchanged.
    pub async fn send(&self, message: &Message) -> TransportResult<()> {
        self.sender
            .send(message)
            .instrument(self.span.clone())
            .await
    }
}
