//! Definición serializable de un pipeline.
//!
//! ```json
//! {
//!   "error_handling": { "max_retries": 2, "retry_strategy": "linear", "fallback_enabled": true },
//!   "steps": [
//!     { "kind": "set_data", "name": "seed", "config": { "values": { "price": 10 } } },
//!     { "kind": "copy_data", "name": "copy", "config": { "from": "price", "to": "base" }, "dependencies": ["seed"] },
//!     { "kind": "require_keys", "name": "guard", "config": { "keys": ["base"] } }
//!   ]
//! }
//! ```

use pipeflow_core::{ConfigurationError, ErrorHandlingConfig, Orchestrator, RetryStrategy, Step};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::registry::StepRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Config de errores parcial: sólo pisa los campos presentes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorHandlingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_strategy: Option<RetryStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_enabled: Option<bool>,
}

impl ErrorHandlingPatch {
    pub fn apply(&self, base: ErrorHandlingConfig) -> ErrorHandlingConfig {
        ErrorHandlingConfig { max_retries: self.max_retries.unwrap_or(base.max_retries),
                              retry_strategy: self.retry_strategy.unwrap_or(base.retry_strategy),
                              fallback_enabled: self.fallback_enabled.unwrap_or(base.fallback_enabled) }
    }

    /// `self` con los campos de `other` por encima.
    pub fn overridden_by(self, other: ErrorHandlingPatch) -> ErrorHandlingPatch {
        ErrorHandlingPatch { max_retries: other.max_retries.or(self.max_retries),
                             retry_strategy: other.retry_strategy.or(self.retry_strategy),
                             fallback_enabled: other.fallback_enabled.or(self.fallback_enabled) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    #[serde(default)]
    pub error_handling: ErrorHandlingPatch,
    pub steps: Vec<StepSpec>,
}

impl PipelineDefinition {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Instancia los steps en orden de declaración.
    pub fn instantiate(&self, registry: &StepRegistry) -> Result<Vec<Box<dyn Step>>, ConfigurationError> {
        self.steps.iter().map(|spec| registry.create(spec)).collect()
    }

    /// Config efectiva: `error_handling` de la definición sobre `base`.
    pub fn effective_config(&self, base: ErrorHandlingConfig) -> ErrorHandlingConfig {
        self.error_handling.apply(base)
    }

    /// Construye el orquestador sobre los defaults del motor.
    pub fn build(&self, registry: &StepRegistry) -> Result<Orchestrator, ConfigurationError> {
        self.build_with(registry, ErrorHandlingConfig::default())
    }

    /// Igual que `build`, con `config` ya resuelta por el llamador.
    /// La validación del pipeline (mínimo de steps, duplicados, config de
    /// cada step) ocurre recién en `Orchestrator::execute`.
    pub fn build_with(&self, registry: &StepRegistry, config: ErrorHandlingConfig) -> Result<Orchestrator, ConfigurationError> {
        let steps = self.instantiate(registry)?;
        debug!(steps = steps.len(), ?config, "pipeline definition instantiated");
        Ok(Orchestrator::builder(config).steps(steps).build())
    }
}
