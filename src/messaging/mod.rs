//! # Messaging Module
//!
//! Value types that flow through the transport: connection strings, option
//! bags and the messages themselves.

pub mod connection;
pub mod message;
pub mod options;

pub use connection::{ConnectionDescriptor, ConnectionStringParser};
pub use message::{Message, MessageMetadata};
pub use options::{ExecutorOptions, TransportOptions};
