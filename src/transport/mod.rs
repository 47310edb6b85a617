//! # Transport
//!
//! Construction of transports from a DSN and an option bag, and the
//! send path from transport to executor.
//!
//! ```text
//! TransportFactory::supports(dsn)
//!   → ConnectionStringParser::parse → ConnectionRegistry::lookup
//! TransportFactory::create_transport(dsn, options)
//!   → ExecutorConfigurator::configure → SenderFactory::create_sender
//! OdmTransport::send(message)
//!   → Sender::send → Executor::execute
//! ```

pub mod factory;
pub mod odm_transport;
pub mod sender;

pub use factory::TransportFactory;
pub use odm_transport::OdmTransport;
pub use sender::{Sender, SenderFactory};
