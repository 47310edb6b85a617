//! # Connection Strings
//!
//! Parses transport DSNs of the form `<protocol>://<connection-name>`.
//!
//! ```rust
//! use odm_transport::messaging::ConnectionStringParser;
//!
//! let parser = ConnectionStringParser::default();
//! let descriptor = parser.parse("vdm+doctrine_odm://reporting").unwrap();
//! assert_eq!(descriptor.connection_name(), "reporting");
//! assert!(parser.is_recognized(&descriptor));
//!
//! let descriptor = parser.parse("vdm+doctrine_odm://").unwrap();
//! assert_eq!(descriptor.connection_name(), "default");
//! ```

use crate::config::TransportConfig;
use crate::constants::{DEFAULT_CONNECTION_NAME, DSN_PROTOCOL, PROTOCOL_SEPARATOR};
use crate::error::{TransportError, TransportResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Protocol and connection name extracted from a DSN. Never has an empty
/// connection name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionDescriptor {
    protocol: String,
    connection_name: String,
}

impl ConnectionDescriptor {
    /// Protocol including the `://` separator.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn connection_name(&self) -> &str {
        &self.connection_name
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.protocol, self.connection_name)
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = TransportError;

    fn from_str(dsn: &str) -> Result<Self, Self::Err> {
        ConnectionStringParser::default().parse(dsn)
    }
}

/// Parser bound to one recognized scheme and one fallback connection name.
#[derive(Debug, Clone)]
pub struct ConnectionStringParser {
    scheme: String,
    default_connection: String,
}

impl ConnectionStringParser {
    pub fn new(scheme: impl Into<String>, default_connection: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            default_connection: default_connection.into(),
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(config.scheme.clone(), config.default_connection.clone())
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Split a DSN into protocol and connection name.
    ///
    /// The protocol is everything up to and including the first `://` and
    /// must be a non-empty run without `:`.
    pub fn parse(&self, dsn: &str) -> TransportResult<ConnectionDescriptor> {
        let (name, rest) = dsn
            .split_once(PROTOCOL_SEPARATOR)
            .ok_or_else(|| TransportError::malformed_connection_string(dsn))?;

        if name.is_empty() || name.contains(':') {
            return Err(TransportError::malformed_connection_string(dsn));
        }

        let connection_name = if rest.is_empty() {
            self.default_connection.clone()
        } else {
            rest.to_string()
        };

        Ok(ConnectionDescriptor {
            protocol: format!("{name}{PROTOCOL_SEPARATOR}"),
            connection_name,
        })
    }

    /// Whether the descriptor belongs to this transport family.
    pub fn is_recognized(&self, descriptor: &ConnectionDescriptor) -> bool {
        descriptor.protocol.starts_with(&self.scheme)
    }
}

impl Default for ConnectionStringParser {
    fn default() -> Self {
        Self::new(DSN_PROTOCOL, DEFAULT_CONNECTION_NAME)
    }
}
