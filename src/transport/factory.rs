//! # Transport Factory
//!
//! Validates transport options, resolves the data store for a DSN, configures
//! the active executor and wraps it in a sender.
//!
//! ## Executor isolation
//!
//! The active executor is resolved once per factory. With
//! [`ExecutorIsolation::PerConfiguration`] the factory keeps one executor
//! instance per configuration (connection, transport name and filtered
//! options): the resolved instance serves the first configuration that
//! configures successfully and later ones get a
//! [`fork`](crate::executor::Executor::fork). A configuration whose
//! `configure` fails leaves no trace in the factory.
//! Executors that cannot fork are shared, as in
//! [`ExecutorIsolation::Shared`], where every transport reconfigures the same
//! instance and the most recent configuration wins.
//!
//! In both modes `configure` runs under a factory-wide lock and only after
//! every validation step has passed.
//!
//! ```rust,no_run
//! use odm_transport::config::TransportConfig;
//! use odm_transport::executor::{DefaultExecutor, ExecutorPtr};
//! use odm_transport::messaging::{Message, TransportOptions};
//! use odm_transport::registry::ExecutorRegistry;
//! use odm_transport::store::ConnectionMap;
//! use odm_transport::transport::TransportFactory;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example(connections: ConnectionMap) -> Result<(), Box<dyn std::error::Error>> {
//! let default: ExecutorPtr = Arc::new(DefaultExecutor::new());
//! let registry = ExecutorRegistry::from_registrations("default", [("default", default)])?;
//! let factory = TransportFactory::new(TransportConfig::default(), &registry, Arc::new(connections))?;
//!
//! let options = TransportOptions::new().with("entities", json!(["Sensor"]));
//! if factory.supports("vdm+doctrine_odm://", &options)? {
//!     let transport = factory.create_transport("vdm+doctrine_odm://", &options)?;
//!     transport.send(&Message::new(json!({"id": 1}))).await?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::{ExecutorIsolation, TransportConfig};
use crate::error::{TransportError, TransportResult};
use crate::executor::{ExecutorConfigurator, ExecutorPtr, JsonSerializer, SerializerPtr};
use crate::logging::log_transport_operation;
use crate::messaging::{ConnectionDescriptor, ConnectionStringParser, ExecutorOptions, TransportOptions};
use crate::registry::{ExecutorRegistry, ResolvedExecutor};
use crate::store::{ConnectionRegistry, DataStorePtr};
use crate::transport::{OdmTransport, SenderFactory};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info_span, warn};

const COMPONENT: &str = "TransportFactory";

/// Identity of one transport configuration in the executor cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConfigurationKey {
    connection_name: String,
    transport_name: Option<String>,
    options: String,
}

impl ConfigurationKey {
    fn new(
        descriptor: &ConnectionDescriptor,
        transport_name: Option<&str>,
        options: &ExecutorOptions,
    ) -> Self {
        Self {
            connection_name: descriptor.connection_name().to_string(),
            transport_name: transport_name.map(str::to_string),
            options: options.fingerprint(),
        }
    }
}

pub struct TransportFactory {
    config: TransportConfig,
    parser: ConnectionStringParser,
    connections: Arc<dyn ConnectionRegistry>,
    serializer: SerializerPtr,
    resolved: ResolvedExecutor,
    /// Executor per successfully configured key
    instances: DashMap<ConfigurationKey, ExecutorPtr>,
    /// Serializes every `configure` call made by this factory
    configure_lock: Mutex<()>,
}

impl TransportFactory {
    /// Resolve the active executor from `registry` and build a factory
    /// around it.
    pub fn new(
        config: TransportConfig,
        registry: &ExecutorRegistry,
        connections: Arc<dyn ConnectionRegistry>,
    ) -> TransportResult<Self> {
        config.validate()?;
        let resolved = registry.resolve()?;

        Ok(Self {
            parser: ConnectionStringParser::from_config(&config),
            config,
            connections,
            serializer: Arc::new(JsonSerializer),
            resolved,
            instances: DashMap::new(),
            configure_lock: Mutex::new(()),
        })
    }

    /// Replace the serializer handed to executors.
    pub fn with_serializer(mut self, serializer: SerializerPtr) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Id of the executor every transport from this factory uses.
    pub fn executor_id(&self) -> &str {
        self.resolved.id()
    }

    /// Number of distinct executor instances configured so far.
    pub fn executor_instances(&self) -> usize {
        match self.config.executor_isolation {
            ExecutorIsolation::Shared => usize::from(!self.instances.is_empty()),
            ExecutorIsolation::PerConfiguration => {
                let mut distinct: Vec<ExecutorPtr> = Vec::new();
                for entry in self.instances.iter() {
                    if !distinct.iter().any(|known| Arc::ptr_eq(known, entry.value())) {
                        distinct.push(entry.value().clone());
                    }
                }
                distinct.len()
            }
        }
    }

    /// Whether this factory handles `dsn`.
    ///
    /// Strings that are not DSNs, and DSNs of other protocols, yield
    /// `Ok(false)` without touching the connection registry. For the
    /// recognized protocol the connection is looked up and a lookup failure
    /// is returned as an error.
    pub fn supports(&self, dsn: &str, _options: &TransportOptions) -> TransportResult<bool> {
        let descriptor = match self.parser.parse(dsn) {
            Ok(descriptor) => descriptor,
            Err(_) => return Ok(false),
        };

        if !self.parser.is_recognized(&descriptor) {
            debug!(protocol = %descriptor.protocol(), "Protocol not handled by this transport");
            return Ok(false);
        }

        self.lookup(&descriptor)?;
        Ok(true)
    }

    /// Build a transport for `dsn`.
    ///
    /// Fails before any executor is configured when `entities` is missing,
    /// the DSN is malformed or of another protocol, or the connection is
    /// unknown.
    pub fn create_transport(
        &self,
        dsn: &str,
        options: &TransportOptions,
    ) -> TransportResult<OdmTransport> {
        if !options.has_entities() {
            return Err(TransportError::missing_entities_option(COMPONENT));
        }

        let transport_name = options.transport_name().map(str::to_string);
        let executor_options = options.for_executor();

        let descriptor = self.parser.parse(dsn)?;
        if !self.parser.is_recognized(&descriptor) {
            return Err(TransportError::configuration(
                COMPONENT,
                format!(
                    "protocol '{}' is not handled, expected '{}'",
                    descriptor.protocol(),
                    self.parser.scheme()
                ),
            ));
        }
        let handle = self.lookup(&descriptor)?;

        let span = info_span!(
            "odm_transport",
            transport = transport_name.as_deref().unwrap_or(""),
            connection = %descriptor.connection_name(),
            executor = %self.resolved.id(),
        );

        let configurator = ExecutorConfigurator::new(
            descriptor.connection_name(),
            handle,
            span.clone(),
            self.serializer.clone(),
            executor_options.clone(),
        );

        let executor = {
            let _guard = self.configure_lock.lock();
            let key = ConfigurationKey::new(&descriptor, transport_name.as_deref(), &executor_options);
            let executor = self.executor_for(&key);
            configurator.configure(executor.as_ref())?;
            self.instances.entry(key).or_insert_with(|| executor.clone());
            executor
        };

        let sender = SenderFactory::new(self.resolved.id(), executor).create_sender();

        log_transport_operation(
            "create_transport",
            transport_name.as_deref(),
            Some(descriptor.connection_name()),
            Some(self.resolved.id()),
            "success",
        );

        Ok(OdmTransport::new(transport_name, descriptor, sender, span))
    }

    fn lookup(&self, descriptor: &ConnectionDescriptor) -> TransportResult<DataStorePtr> {
        let connection_name = descriptor.connection_name();
        self.connections
            .lookup(connection_name)
            .map_err(|err| match err {
                TransportError::UnknownConnection { .. } => err,
                other => TransportError::unknown_connection(connection_name, other.to_string()),
            })
    }

    /// Executor instance for one configuration. Caller holds `configure_lock`
    /// and records the instance in `instances` once `configure` succeeds.
    fn executor_for(&self, key: &ConfigurationKey) -> ExecutorPtr {
        let resolved = self.resolved.executor();

        if self.config.executor_isolation == ExecutorIsolation::Shared {
            return resolved.clone();
        }

        if let Some(existing) = self.instances.get(key) {
            return existing.value().clone();
        }

        if self.instances.is_empty() {
            return resolved.clone();
        }

        match resolved.fork() {
            Some(fork) => fork,
            None => {
                warn!(
                    executor_id = %self.resolved.id(),
                    connection = %key.connection_name,
                    "Executor cannot fork; sharing one instance across configurations"
                );
                resolved.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ContextSlot, Executor, ExecutorContext};
    use crate::messaging::Message;
    use crate::store::{ConnectionMap, DataStoreHandle};
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullStore(&'static str);

    #[async_trait]
    impl DataStoreHandle for NullStore {
        fn name(&self) -> &str {
            self.0
        }

        async fn upsert(&self, _: &str, _: &Map<String, Value>, _: Value) -> TransportResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingExecutor {
        slot: ContextSlot,
        configured: AtomicUsize,
        forkable: bool,
    }

    #[async_trait]
    impl Executor for CountingExecutor {
        fn configure(&self, context: ExecutorContext) -> TransportResult<()> {
            if context.options.get("reject").is_some() {
                return Err(TransportError::configuration("counting", "rejected options"));
            }
            self.configured.fetch_add(1, Ordering::SeqCst);
            self.slot.set(context);
            Ok(())
        }

        async fn execute(&self, _: &Message) -> TransportResult<()> {
            self.slot.require("counting").map(|_| ())
        }

        fn fork(&self) -> Option<ExecutorPtr> {
            self.forkable.then(|| {
                Arc::new(CountingExecutor {
                    forkable: true,
                    ..CountingExecutor::default()
                }) as ExecutorPtr
            })
        }
    }

    fn factory(isolation: ExecutorIsolation, executor: Arc<CountingExecutor>) -> TransportFactory {
        let registry =
            ExecutorRegistry::from_registrations("default", [("counting", executor as ExecutorPtr)])
                .unwrap();
        let connections = ConnectionMap::new()
            .with_handle(Arc::new(NullStore("default")))
            .with_handle(Arc::new(NullStore("archive")));
        let config = TransportConfig {
            executor_isolation: isolation,
            ..TransportConfig::default()
        };
        TransportFactory::new(config, &registry, Arc::new(connections)).unwrap()
    }

    fn options(entity: &str) -> TransportOptions {
        TransportOptions::new().with("entities", json!([entity]))
    }

    #[test]
    fn test_new_requires_an_executor() {
        let registry = ExecutorRegistry::new("default");
        let result = TransportFactory::new(
            TransportConfig::default(),
            &registry,
            Arc::new(ConnectionMap::new()),
        );
        assert!(matches!(result, Err(TransportError::NoExecutorRegistered)));
    }

    #[test]
    fn test_create_rejects_other_protocols() {
        let executor = Arc::new(CountingExecutor::default());
        let factory = factory(ExecutorIsolation::PerConfiguration, executor.clone());

        let err = factory
            .create_transport("amqp://localhost", &options("A"))
            .unwrap_err();
        assert!(matches!(err, TransportError::Configuration { .. }));
        assert_eq!(executor.configured.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_per_configuration_forks_for_new_keys() {
        let executor = Arc::new(CountingExecutor {
            forkable: true,
            ..CountingExecutor::default()
        });
        let factory = factory(ExecutorIsolation::PerConfiguration, executor.clone());

        let first = factory
            .create_transport("vdm+doctrine_odm://", &options("A"))
            .unwrap();
        let second = factory
            .create_transport("vdm+doctrine_odm://archive", &options("A"))
            .unwrap();
        let again = factory
            .create_transport("vdm+doctrine_odm://", &options("A"))
            .unwrap();

        assert_eq!(factory.executor_instances(), 2);
        assert_eq!(executor.configured.load(Ordering::SeqCst), 2);
        assert_eq!(first.executor_id(), "counting");
        assert_eq!(second.connection().connection_name(), "archive");
        assert_eq!(again.connection().connection_name(), "default");
    }

    #[test]
    fn test_per_configuration_shares_when_fork_unsupported() {
        let executor = Arc::new(CountingExecutor::default());
        let factory = factory(ExecutorIsolation::PerConfiguration, executor.clone());

        factory
            .create_transport("vdm+doctrine_odm://", &options("A"))
            .unwrap();
        factory
            .create_transport("vdm+doctrine_odm://archive", &options("B"))
            .unwrap();

        assert_eq!(factory.executor_instances(), 1);
        assert_eq!(executor.configured.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_shared_isolation_reconfigures_single_instance() {
        let executor = Arc::new(CountingExecutor {
            forkable: true,
            ..CountingExecutor::default()
        });
        let factory = factory(ExecutorIsolation::Shared, executor.clone());

        factory
            .create_transport("vdm+doctrine_odm://", &options("A"))
            .unwrap();
        factory
            .create_transport("vdm+doctrine_odm://archive", &options("B"))
            .unwrap();

        assert_eq!(factory.executor_instances(), 1);
        assert_eq!(executor.configured.load(Ordering::SeqCst), 2);
        assert_eq!(
            executor.slot.get().unwrap().connection_name,
            "archive".to_string()
        );
    }

    #[tokio::test]
    async fn test_transport_sends_through_configured_executor() {
        let executor = Arc::new(CountingExecutor::default());
        let factory = factory(ExecutorIsolation::PerConfiguration, executor);

        let transport = factory
            .create_transport(
                "vdm+doctrine_odm://",
                &options("A").with("transport_name", "sensors"),
            )
            .unwrap();

        assert_eq!(transport.name(), Some("sensors"));
        transport.send(&Message::new(json!({"id": 1}))).await.unwrap();
    }

    #[test]
    fn test_lookalike_options_get_separate_executors() {
        let executor = Arc::new(CountingExecutor {
            forkable: true,
            ..CountingExecutor::default()
        });
        let factory = factory(ExecutorIsolation::PerConfiguration, executor.clone());

        factory
            .create_transport("vdm+doctrine_odm://", &options("A").with("x", 1).with("y", 2))
            .unwrap();
        factory
            .create_transport("vdm+doctrine_odm://", &options("A").with("x=1;y", 2))
            .unwrap();

        assert_eq!(factory.executor_instances(), 2);
        assert_eq!(executor.configured.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_configure_leaves_no_cached_instance() {
        let executor = Arc::new(CountingExecutor {
            forkable: true,
            ..CountingExecutor::default()
        });
        let factory = factory(ExecutorIsolation::PerConfiguration, executor.clone());

        let err = factory
            .create_transport("vdm+doctrine_odm://", &options("A").with("reject", true))
            .unwrap_err();
        assert!(matches!(err, TransportError::Configuration { .. }));
        assert_eq!(factory.executor_instances(), 0);

        factory
            .create_transport("vdm+doctrine_odm://", &options("A"))
            .unwrap();

        assert_eq!(factory.executor_instances(), 1);
        assert_eq!(executor.configured.load(Ordering::SeqCst), 1);
        assert!(executor.slot.is_set());
    }

    #[test]
    fn test_transport_names_get_separate_executors() {
        let executor = Arc::new(CountingExecutor {
            forkable: true,
            ..CountingExecutor::default()
        });
        let factory = factory(ExecutorIsolation::PerConfiguration, executor.clone());

        let sensors = factory
            .create_transport(
                "vdm+doctrine_odm://",
                &options("A").with("transport_name", "sensors"),
            )
            .unwrap();
        factory
            .create_transport(
                "vdm+doctrine_odm://",
                &options("A").with("transport_name", "readings"),
            )
            .unwrap();

        assert_eq!(factory.executor_instances(), 2);
        assert_eq!(executor.configured.load(Ordering::SeqCst), 1);
        assert_eq!(sensors.name(), Some("sensors"));
    }
}
