//! # Transport Constants
//!
//! Fixed names shared by the parser, the factory and the default executor.

/// DSN scheme recognized by this transport family.
pub const DSN_PROTOCOL: &str = "vdm+doctrine_odm://";

/// Separator between protocol and connection name.
pub const PROTOCOL_SEPARATOR: &str = "://";

/// Connection name used when the DSN leaves it empty.
pub const DEFAULT_CONNECTION_NAME: &str = "default";

/// Registration id of the fallback executor.
pub const DEFAULT_EXECUTOR_ID: &str = "default";

/// Option keys understood by the transport layer.
pub mod options {
    /// Required: entities handled by the executor.
    pub const ENTITIES: &str = "entities";

    /// Reserved: routing metadata, never forwarded to an executor.
    pub const TRANSPORT_NAME: &str = "transport_name";

    /// Per-entity identifier fields used by the default executor.
    pub const SELECTOR: &str = "selector";

    /// Keys stripped from options before they reach an executor.
    pub const RESERVED: &[&str] = &[TRANSPORT_NAME];
}

/// Identifier field assumed when an entity declares no selector.
pub const DEFAULT_SELECTOR_FIELD: &str = "id";
