//! Registro `kind` → constructor de step.

use std::collections::BTreeMap;

use pipeflow_core::{ConfigurationError, Step};

use crate::definition::StepSpec;
use crate::steps::{CopyDataStep, FailStep, RequireKeysStep, SetDataStep};

/// Construye un step a partir de su entrada en la definición.
pub type StepFactory = fn(&StepSpec) -> Result<Box<dyn Step>, ConfigurationError>;

#[derive(Clone)]
pub struct StepRegistry {
    factories: BTreeMap<String, StepFactory>,
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry").field("kinds", &self.factories.keys()).finish()
    }
}

impl Default for StepRegistry {
    /// Registro con los steps genéricos del crate.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("set_data", |spec| Ok(Box::new(SetDataStep::from_spec(spec)?)));
        registry.register("copy_data", |spec| Ok(Box::new(CopyDataStep::from_spec(spec)?)));
        registry.register("require_keys", |spec| Ok(Box::new(RequireKeysStep::from_spec(spec)?)));
        registry.register("fail", |spec| Ok(Box::new(FailStep::from_spec(spec)?)));
        registry
    }
}

impl StepRegistry {
    pub fn empty() -> Self {
        Self { factories: BTreeMap::new() }
    }

    /// Registra (o reemplaza) el constructor de `kind`.
    pub fn register(&mut self, kind: impl Into<String>, factory: StepFactory) -> &mut Self {
        self.factories.insert(kind.into(), factory);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Kinds registrados, en orden alfabético.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn create(&self, spec: &StepSpec) -> Result<Box<dyn Step>, ConfigurationError> {
        let factory = self.factories
                          .get(&spec.kind)
                          .ok_or_else(|| ConfigurationError::UnknownKind(spec.kind.clone()))?;
        factory(spec)
    }
}
