//! # Default Executor
//!
//! Fallback strategy registered under the default executor id. It yields to
//! any custom executor at resolution time.
//!
//! For every entity listed in the `entities` option the executor:
//!
//! 1. normalizes the message with the configured serializer
//! 2. collects the entity's selector fields from the payload as identifiers
//! 3. drops `null` fields unless the entity declares them nullable
//! 4. hands `(entity, identifiers, document)` to the data store's `upsert`
//!
//! `entities` may be a single name, a list of names, or a map of
//! name → `{ "selector": [field, ...] }`. The selector defaults to `["id"]`.

use super::traits::{Executor, ExecutorContext, ExecutorPtr};
use crate::constants::options::{ENTITIES, SELECTOR};
use crate::constants::DEFAULT_SELECTOR_FIELD;
use crate::error::{TransportError, TransportResult};
use crate::messaging::{ExecutorOptions, Message};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, Instrument};

const EXECUTOR_NAME: &str = "DefaultExecutor";

/// Entity types whose fields may legitimately be stored as `null`.
pub trait NullableFields {
    /// Entity name as used in the `entities` option.
    fn entity_name() -> &'static str;

    fn nullable_fields() -> &'static [&'static str];
}

/// Where and how one entity is written.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPlan {
    pub entity: String,
    pub selector: Vec<String>,
}

impl EntityPlan {
    fn with_default_selector(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            selector: vec![DEFAULT_SELECTOR_FIELD.to_string()],
        }
    }

    /// Read the plans out of executor options.
    pub fn from_options(options: &ExecutorOptions) -> TransportResult<Vec<Self>> {
        match options.entities() {
            Some(Value::String(entity)) if !entity.is_empty() => {
                Ok(vec![Self::with_default_selector(entity.as_str())])
            }
            Some(Value::Array(entities)) if !entities.is_empty() => entities
                .iter()
                .map(|entity| match entity {
                    Value::String(name) if !name.is_empty() => {
                        Ok(Self::with_default_selector(name.as_str()))
                    }
                    other => Err(invalid_entities(format!(
                        "entity names must be non-empty strings, got {other}"
                    ))),
                })
                .collect(),
            Some(Value::Object(entities)) if !entities.is_empty() => entities
                .iter()
                .map(|(name, settings)| Self::from_settings(name, settings))
                .collect(),
            _ => Err(TransportError::missing_entities_option(EXECUTOR_NAME)),
        }
    }

    fn from_settings(entity: &str, settings: &Value) -> TransportResult<Self> {
        let selector = match settings.get(SELECTOR) {
            None | Some(Value::Null) => return Ok(Self::with_default_selector(entity)),
            Some(Value::String(field)) => vec![field.clone()],
            Some(Value::Array(fields)) => fields
                .iter()
                .map(|field| {
                    field.as_str().map(str::to_string).ok_or_else(|| {
                        invalid_entities(format!("selector of '{entity}' must list field names"))
                    })
                })
                .collect::<TransportResult<Vec<_>>>()?,
            Some(other) => {
                return Err(invalid_entities(format!(
                    "selector of '{entity}' must be a field name or a list, got {other}"
                )))
            }
        };

        if selector.is_empty() {
            return Err(invalid_entities(format!("selector of '{entity}' is empty")));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = selector.iter().find(|field| !seen.insert(field.as_str())) {
            return Err(invalid_entities(format!(
                "selector of '{entity}' lists '{duplicate}' more than once"
            )));
        }

        Ok(Self {
            entity: entity.to_string(),
            selector,
        })
    }
}

fn invalid_entities(message: String) -> TransportError {
    TransportError::configuration(format!("{EXECUTOR_NAME}.{ENTITIES}"), message)
}

/// Context and plans from one `configure` call, swapped in as a unit.
#[derive(Debug, Clone)]
struct Configured {
    context: ExecutorContext,
    plans: Vec<EntityPlan>,
}

/// Executor used when no custom executor is registered.
#[derive(Debug, Default)]
pub struct DefaultExecutor {
    state: RwLock<Option<Configured>>,
    nullable: HashMap<String, HashSet<String>>,
}

impl DefaultExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the nullable fields of `T`.
    pub fn with_nullable<T: NullableFields>(mut self) -> Self {
        self.nullable
            .entry(T::entity_name().to_string())
            .or_default()
            .extend(T::nullable_fields().iter().map(|field| field.to_string()));
        self
    }

    pub fn is_configured(&self) -> bool {
        self.state.read().is_some()
    }

    fn configured(&self) -> TransportResult<Configured> {
        self.state
            .read()
            .clone()
            .ok_or_else(|| TransportError::executor_not_configured(EXECUTOR_NAME))
    }

    fn is_nullable(&self, entity: &str, field: &str) -> bool {
        self.nullable
            .get(entity)
            .map(|fields| fields.contains(field))
            .unwrap_or(false)
    }

    /// Identifiers and stored document for one entity.
    fn prepare(
        &self,
        plan: &EntityPlan,
        payload: &Map<String, Value>,
    ) -> TransportResult<(Map<String, Value>, Value)> {
        let identifiers: Map<String, Value> = plan
            .selector
            .iter()
            .filter_map(|field| match payload.get(field) {
                Some(Value::Null) | None => None,
                Some(value) => Some((field.clone(), value.clone())),
            })
            .collect();

        if identifiers.len() != plan.selector.len() {
            return Err(TransportError::invalid_identifiers_count(
                plan.entity.as_str(),
                plan.selector.len(),
                identifiers.len(),
            ));
        }

        let document: Map<String, Value> = payload
            .iter()
            .filter(|(field, value)| !value.is_null() || self.is_nullable(&plan.entity, field))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();

        Ok((identifiers, Value::Object(document)))
    }

    async fn write_entities(&self, configured: Configured, message: &Message) -> TransportResult<()> {
        let Configured { context, plans } = configured;

        let payload = match context.serializer.normalize(message)? {
            Value::Object(payload) => payload,
            other => {
                return Err(TransportError::serialization(format!(
                    "message {} did not normalize to an object: {other}",
                    message.message_id
                )))
            }
        };

        for plan in &plans {
            let (identifiers, document) = self.prepare(plan, &payload)?;
            debug!(
                message_id = %message.message_id,
                entity = %plan.entity,
                "Upserting document"
            );
            context
                .handle
                .upsert(&plan.entity, &identifiers, document)
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl Executor for DefaultExecutor {
    fn configure(&self, context: ExecutorContext) -> TransportResult<()> {
        let plans = EntityPlan::from_options(&context.options)?;
        debug!(
            connection_name = %context.connection_name,
            entities = plans.len(),
            "DefaultExecutor configured"
        );
        *self.state.write() = Some(Configured { context, plans });
        Ok(())
    }

    async fn execute(&self, message: &Message) -> TransportResult<()> {
        let configured = self.configured()?;
        let span = configured.context.span.clone();
        self.write_entities(configured, message)
            .instrument(span)
            .await
    }

    fn fork(&self) -> Option<ExecutorPtr> {
        Some(Arc::new(DefaultExecutor {
            state: RwLock::new(None),
            nullable: self.nullable.clone(),
        }))
    }
}
