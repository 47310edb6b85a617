//! # Transport Configuration
//!
//! Process-level settings for the transport factory. Values are layered with
//! the `config` crate: built-in defaults, then an optional file, then
//! `ODM_TRANSPORT_*` environment variables.
//!
//! ```rust,no_run
//! use odm_transport::config::TransportConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TransportConfig::load("config/odm-transport.toml")?;
//! println!("default executor: {}", config.default_executor_id);
//! # Ok(())
//! # }
//! ```

use crate::constants::{
    DEFAULT_CONNECTION_NAME, DEFAULT_EXECUTOR_ID, DSN_PROTOCOL, PROTOCOL_SEPARATOR,
};
use crate::error::{TransportError, TransportResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Prefix of the environment variables read by [`TransportConfig::from_env`].
pub const ENV_PREFIX: &str = "ODM_TRANSPORT";

/// How executors are shared between transports built by one factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorIsolation {
    /// Every transport reconfigures the single resolved executor instance.
    Shared,
    /// One executor instance per distinct connection/options pair.
    #[default]
    PerConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Scheme prefix accepted by `supports`.
    pub scheme: String,
    /// Connection name used when the DSN has none.
    pub default_connection: String,
    /// Registration id of the fallback executor.
    pub default_executor_id: String,
    pub executor_isolation: ExecutorIsolation,
    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            scheme: DSN_PROTOCOL.to_string(),
            default_connection: DEFAULT_CONNECTION_NAME.to_string(),
            default_executor_id: DEFAULT_EXECUTOR_ID.to_string(),
            executor_isolation: ExecutorIsolation::default(),
            json_logs: false,
        }
    }
}

impl TransportConfig {
    /// Defaults overridden by `ODM_TRANSPORT_*` environment variables.
    pub fn from_env() -> TransportResult<Self> {
        Self::build(None)
    }

    /// Defaults, then the given file, then environment variables.
    pub fn load(path: impl AsRef<Path>) -> TransportResult<Self> {
        Self::build(Some(path.as_ref()))
    }

    fn build(path: Option<&Path>) -> TransportResult<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading transport configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: TransportConfig = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TransportResult<()> {
        let scheme_name = self.scheme.strip_suffix(PROTOCOL_SEPARATOR).unwrap_or("");
        if scheme_name.is_empty() || scheme_name.contains(':') {
            return Err(TransportError::configuration(
                "TransportConfig",
                format!("scheme '{}' must look like '<name>://'", self.scheme),
            ));
        }

        if self.default_connection.is_empty() {
            return Err(TransportError::configuration(
                "TransportConfig",
                "default_connection cannot be empty",
            ));
        }

        if self.default_executor_id.is_empty() {
            return Err(TransportError::configuration(
                "TransportConfig",
                "default_executor_id cannot be empty",
            ));
        }

        Ok(())
    }
}
