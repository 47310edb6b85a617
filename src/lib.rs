#![allow(clippy::doc_markdown)] // Allow technical terms like MongoDB, DSN in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # ODM Transport
//!
//! Message transport that persists outbound messages through a single,
//! pluggable executor strategy resolved at configuration time.
//!
//! ## Overview
//!
//! The host application registers one or more executors, a map of data store
//! connections and a configuration. The transport factory then:
//!
//! 1. resolves exactly one active executor (a registered custom executor
//!    always wins over the default one)
//! 2. accepts DSNs of the form `vdm+doctrine_odm://<connection>`
//! 3. configures the executor with the connection's store handle, a logging
//!    span, a serializer and the transport options
//! 4. hands back a transport whose `send` forwards messages to the executor
//!
//! ## Module Organization
//!
//! - [`registry`] - Executor registration and resolution
//! - [`messaging`] - DSN parsing, transport options and messages
//! - [`executor`] - Executor interface, configurator and default executor
//! - [`store`] - Data store handle and connection lookup
//! - [`transport`] - Transport factory, transport and sender
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use odm_transport::{
//!     ConnectionMap, DefaultExecutor, ExecutorPtr, ExecutorRegistry, Message, TransportConfig,
//!     TransportFactory, TransportOptions,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example(connections: ConnectionMap) -> Result<(), Box<dyn std::error::Error>> {
//! let config = TransportConfig::from_env()?;
//! odm_transport::logging::init_structured_logging(config.json_logs);
//!
//! let default: ExecutorPtr = Arc::new(DefaultExecutor::new());
//! let registry = ExecutorRegistry::from_registrations(config.default_executor_id.clone(), [("default", default)])?;
//! let factory = TransportFactory::new(config, &registry, Arc::new(connections))?;
//!
//! let options = TransportOptions::new()
//!     .with("entities", json!({"Reading": {"selector": ["sensor_id", "taken_at"]}}))
//!     .with("transport_name", "readings");
//! let transport = factory.create_transport("vdm+doctrine_odm://", &options)?;
//!
//! transport
//!     .send(&Message::new(json!({"sensor_id": 7, "taken_at": "2024-05-01T10:00:00Z", "value": 21.5})))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod executor;
pub mod logging;
pub mod messaging;
pub mod registry;
pub mod store;
pub mod transport;

pub use config::{ExecutorIsolation, TransportConfig};
pub use error::{TransportError, TransportResult};
pub use executor::{
    DefaultExecutor, Executor, ExecutorConfigurator, ExecutorContext, ExecutorPtr, JsonSerializer,
    MessageSerializer, NullableFields,
};
pub use messaging::{ConnectionDescriptor, ConnectionStringParser, Message, TransportOptions};
pub use registry::{ExecutorRegistry, ResolvedExecutor};
pub use store::{ConnectionMap, ConnectionRegistry, DataStoreHandle, DataStorePtr};
pub use transport::{OdmTransport, Sender, SenderFactory, TransportFactory};
