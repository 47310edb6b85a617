//! # Data Store Collaborators
//!
//! Abstractions over the document store an executor writes to, and over the
//! lookup that maps a connection name to a store handle. Concrete storage is
//! provided by the host application.

use crate::error::{TransportError, TransportResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Handle to one document store connection.
#[async_trait]
pub trait DataStoreHandle: Send + Sync {
    /// Connection name this handle was registered under.
    fn name(&self) -> &str;

    /// Insert or update the document of `entity` matching `identifiers`.
    async fn upsert(
        &self,
        entity: &str,
        identifiers: &Map<String, Value>,
        document: Value,
    ) -> TransportResult<()>;
}

pub type DataStorePtr = Arc<dyn DataStoreHandle>;

/// Resolves connection names to store handles.
pub trait ConnectionRegistry: Send + Sync {
    /// Fails with [`TransportError::UnknownConnection`] for names it does not know.
    fn lookup(&self, connection_name: &str) -> TransportResult<DataStorePtr>;
}

/// Explicit name to handle map assembled by the host application.
#[derive(Default, Clone)]
pub struct ConnectionMap {
    handles: HashMap<String, DataStorePtr>,
}

impl ConnectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle under its own name.
    pub fn with_handle(mut self, handle: DataStorePtr) -> Self {
        self.register(handle);
        self
    }

    pub fn register(&mut self, handle: DataStorePtr) {
        let name = handle.name().to_string();
        debug!(connection_name = %name, "Registered data store connection");
        self.handles.insert(name, handle);
    }

    pub fn connection_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ConnectionRegistry for ConnectionMap {
    fn lookup(&self, connection_name: &str) -> TransportResult<DataStorePtr> {
        self.handles.get(connection_name).cloned().ok_or_else(|| {
            TransportError::unknown_connection(
                connection_name,
                format!("known connections: [{}]", self.connection_names().join(", ")),
            )
        })
    }
}
