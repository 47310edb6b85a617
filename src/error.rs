//! # Transport Error Types
//!
//! Structured error handling for executor resolution, transport construction
//! and message dispatch, using thiserror instead of `Box<dyn Error>` patterns.
//!
//! Errors fall into three groups:
//!
//! - **Configuration**: raised while building a transport (missing `entities`,
//!   malformed DSN, unknown connection, duplicate executor ids)
//! - **Resolution**: no executor could be selected
//! - **Send-time**: raised by the executor and returned from `send` untouched

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Malformed connection string '{dsn}': expected <protocol>://<connection>")]
    MalformedConnectionString { dsn: String },

    #[error("{component} requires that you define at least one entity value in the transport's options")]
    MissingEntitiesOption { component: String },

    #[error("Unknown connection '{connection_name}': {reason}")]
    UnknownConnection {
        connection_name: String,
        reason: String,
    },

    #[error("No executor registered")]
    NoExecutorRegistered,

    #[error("Executor '{executor_id}' is already registered")]
    DuplicateExecutor { executor_id: String },

    #[error("Executor '{executor_id}' has not been configured")]
    ExecutorNotConfigured { executor_id: String },

    #[error("Invalid identifiers count for entity '{entity}': expected {expected}, found {found}")]
    InvalidIdentifiersCount {
        entity: String,
        expected: usize,
        found: usize,
    },

    #[error("Message serialization error: {message}")]
    Serialization { message: String },

    #[error("Data store error: {connection_name}: {message}")]
    DataStore {
        connection_name: String,
        message: String,
    },

    #[error("Configuration error: {component}: {message}")]
    Configuration { component: String, message: String },
}

impl TransportError {
    pub fn malformed_connection_string(dsn: impl Into<String>) -> Self {
        Self::MalformedConnectionString { dsn: dsn.into() }
    }

    pub fn missing_entities_option(component: impl Into<String>) -> Self {
        Self::MissingEntitiesOption {
            component: component.into(),
        }
    }

    pub fn unknown_connection(connection_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnknownConnection {
            connection_name: connection_name.into(),
            reason: reason.into(),
        }
    }

    pub fn duplicate_executor(executor_id: impl Into<String>) -> Self {
        Self::DuplicateExecutor {
            executor_id: executor_id.into(),
        }
    }

    pub fn executor_not_configured(executor_id: impl Into<String>) -> Self {
        Self::ExecutorNotConfigured {
            executor_id: executor_id.into(),
        }
    }

    pub fn invalid_identifiers_count(entity: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::InvalidIdentifiersCount {
            entity: entity.into(),
            expected,
            found,
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn data_store(connection_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataStore {
            connection_name: connection_name.into(),
            message: message.into(),
        }
    }

    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// True for errors raised while building a transport rather than while sending.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedConnectionString { .. }
                | Self::MissingEntitiesOption { .. }
                | Self::UnknownConnection { .. }
                | Self::DuplicateExecutor { .. }
                | Self::NoExecutorRegistered
                | Self::Configuration { .. }
        )
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::serialization(err.to_string())
    }
}

impl From<config::ConfigError> for TransportError {
    fn from(err: config::ConfigError) -> Self {
        TransportError::configuration("config", err.to_string())
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
