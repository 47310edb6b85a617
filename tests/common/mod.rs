//! Shared fakes for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use odm_transport::{
    ConnectionMap, ConnectionRegistry, DataStoreHandle, DataStorePtr, Executor, ExecutorContext,
    Message, TransportError, TransportResult,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use std::sync::Arc;

/// One `execute` call as seen by [`RecordingExecutor`].
#[derive(Debug, Clone)]
pub struct ExecutedMessage {
    pub message: Message,
    /// Address of the message the executor was handed
    pub address: usize,
}

/// Executor that records every configure and execute call.
#[derive(Default)]
pub struct RecordingExecutor {
    pub contexts: Mutex<Vec<ExecutorContext>>,
    pub executed: Mutex<Vec<ExecutedMessage>>,
    /// Error returned from every `execute` when set
    pub failure: Mutex<Option<fn() -> TransportError>>,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(failure: fn() -> TransportError) -> Arc<Self> {
        let executor = Self::default();
        *executor.failure.lock() = Some(failure);
        Arc::new(executor)
    }

    pub fn configure_calls(&self) -> usize {
        self.contexts.lock().len()
    }

    pub fn last_context(&self) -> Option<ExecutorContext> {
        self.contexts.lock().last().cloned()
    }

    pub fn executed(&self) -> Vec<ExecutedMessage> {
        self.executed.lock().clone()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    fn configure(&self, context: ExecutorContext) -> TransportResult<()> {
        self.contexts.lock().push(context);
        Ok(())
    }

    async fn execute(&self, message: &Message) -> TransportResult<()> {
        self.executed.lock().push(ExecutedMessage {
            message: message.clone(),
            address: message as *const Message as usize,
        });

        match *self.failure.lock() {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }
}

/// Executor whose `configure` notices when another `configure` is running.
#[derive(Default)]
pub struct OverlapDetectingExecutor {
    in_flight: AtomicBool,
    pub overlaps: AtomicUsize,
    pub configured: AtomicUsize,
}

#[async_trait]
impl Executor for OverlapDetectingExecutor {
    fn configure(&self, _context: ExecutorContext) -> TransportResult<()> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        thread::sleep(Duration::from_millis(5));
        self.configured.fetch_add(1, Ordering::SeqCst);
        self.in_flight.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn execute(&self, _message: &Message) -> TransportResult<()> {
        Ok(())
    }
}

/// Data store that keeps every upsert in memory.
pub struct MemoryStore {
    name: String,
    pub writes: Mutex<Vec<(String, Map<String, Value>, Value)>>,
}

impl MemoryStore {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            writes: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl DataStoreHandle for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert(
        &self,
        entity: &str,
        identifiers: &Map<String, Value>,
        document: Value,
    ) -> TransportResult<()> {
        self.writes
            .lock()
            .push((entity.to_string(), identifiers.clone(), document));
        Ok(())
    }
}

/// Connection registry that counts lookups.
pub struct CountingConnections {
    inner: ConnectionMap,
    lookups: AtomicUsize,
}

impl CountingConnections {
    pub fn new(names: &[&str]) -> Arc<Self> {
        let mut inner = ConnectionMap::new();
        for name in names {
            inner.register(MemoryStore::new(name));
        }
        Arc::new(Self {
            inner,
            lookups: AtomicUsize::new(0),
        })
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ConnectionRegistry for CountingConnections {
    fn lookup(&self, connection_name: &str) -> TransportResult<DataStorePtr> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(connection_name)
    }
}
