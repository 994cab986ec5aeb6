//! Stage registry: the factory meta-operations create their stages through.

use std::fmt;
use std::sync::Arc;

use lumaglow_core::{GraphError, ParamValues, Result};
use tracing::debug;

use crate::catalog;
use crate::stage::{OpaqueStage, Stage, StageDescriptor};

/// Produces stages of one kind.
pub trait StageFactory: Send + Sync {
    /// Kind name this factory answers to.
    fn kind(&self) -> &str;

    /// Create a fresh stage with `initial` parameter values applied.
    fn create(&self, initial: &ParamValues) -> Result<Box<dyn Stage>>;
}

/// Factory backed by a static descriptor, yielding [`OpaqueStage`]s.
pub struct DescriptorFactory {
    descriptor: Arc<StageDescriptor>,
}

impl DescriptorFactory {
    pub fn new(descriptor: StageDescriptor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
        }
    }

    pub fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }
}

impl StageFactory for DescriptorFactory {
    fn kind(&self) -> &str {
        &self.descriptor.kind
    }

    fn create(&self, initial: &ParamValues) -> Result<Box<dyn Stage>> {
        Ok(Box::new(OpaqueStage::new(Arc::clone(&self.descriptor), initial)?))
    }
}

/// Catalog of stage kinds.
pub struct StageRegistry {
    factories: Vec<Box<dyn StageFactory>>,
}

impl StageRegistry {
    /// Create a registry with the built-in stage kinds.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for descriptor in catalog::builtin() {
            registry.register(Box::new(DescriptorFactory::new(descriptor)));
        }
        registry
    }

    /// Create a registry that knows no kinds at all.
    pub fn empty() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Add a factory. A later registration shadows an earlier one of the same kind.
    pub fn register(&mut self, factory: Box<dyn StageFactory>) {
        debug!(kind = factory.kind(), "Registering stage kind");
        self.factories.retain(|f| f.kind() != factory.kind());
        self.factories.push(factory);
    }

    /// Find a factory by kind name.
    pub fn find(&self, kind: &str) -> Option<&dyn StageFactory> {
        self.factories
            .iter()
            .find(|f| f.kind() == kind)
            .map(|f| f.as_ref())
    }

    /// Registered kind names, in registration order.
    pub fn kinds(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.kind()).collect()
    }

    /// Instantiate a stage of `kind`.
    pub fn create(&self, kind: &str, initial: &ParamValues) -> Result<Box<dyn Stage>> {
        let factory = self
            .find(kind)
            .ok_or_else(|| GraphError::UnknownStageKind(kind.to_string()))?;
        factory.create(initial)
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRegistry").field("kinds", &self.kinds()).finish()
    }
}
