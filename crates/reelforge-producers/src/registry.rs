//! A deterministic, `BTreeMap`-backed producer registry (grounded in the
//! same shape as a plugin registry: register by name, resolve by name,
//! iterate in sorted order for reproducible diagnostics).

use std::collections::BTreeMap;
use std::sync::Arc;

use reelforge_core::producer::ProducerHandler;

use crate::errors::{ProducersError, ProducersResult};
use crate::spec::ProducerDescriptor;

pub struct RegisteredProducer {
    pub descriptor: ProducerDescriptor,
    pub handler: Arc<dyn ProducerHandler>,
}

#[derive(Default)]
pub struct ProducerRegistry {
    entries: BTreeMap<String, RegisteredProducer>,
}

impl ProducerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        descriptor: ProducerDescriptor,
        handler: Arc<dyn ProducerHandler>,
    ) -> ProducersResult<()> {
        let name = descriptor.id.to_string();
        if self.entries.contains_key(&name) {
            return Err(ProducersError::AlreadyRegistered(name));
        }
        self.entries.insert(name, RegisteredProducer { descriptor, handler });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredProducer> {
        self.entries.get(name)
    }

    /// Names of every registered producer, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Resolves a producer name to its handler, raising [`ProducersError::NotFound`]
/// rather than letting the runner panic on a missing registration.
pub struct ProducerResolver {
    registry: Arc<ProducerRegistry>,
}

impl ProducerResolver {
    pub fn new(registry: Arc<ProducerRegistry>) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, name: &str) -> ProducersResult<Arc<dyn ProducerHandler>> {
        self.registry
            .get(name)
            .map(|entry| entry.handler.clone())
            .ok_or_else(|| ProducersError::NotFound(name.to_string()))
    }
}
