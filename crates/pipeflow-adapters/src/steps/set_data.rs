//! SetDataStep: escribe pares clave/valor fijos en el contexto.

use async_trait::async_trait;
use pipeflow_core::{ConfigurationError, ExecutionContext, Step, StepError};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::parse_params;
use crate::definition::StepSpec;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetDataParams {
    /// Valores a escribir. La salida del step es este mismo objeto.
    #[serde(default)]
    pub values: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct SetDataStep {
    name: String,
    dependencies: Vec<String>,
    params: SetDataParams,
}

impl SetDataStep {
    pub fn new(name: impl Into<String>, values: Map<String, Value>) -> Self {
        Self { name: name.into(),
               dependencies: Vec::new(),
               params: SetDataParams { values } }
    }

    pub fn from_spec(spec: &StepSpec) -> Result<Self, ConfigurationError> {
        Ok(Self { name: spec.name.clone(),
                  dependencies: spec.dependencies.clone(),
                  params: parse_params(spec)? })
    }
}

#[async_trait]
impl Step for SetDataStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    fn check_config(&self) -> Result<(), ConfigurationError> {
        if self.params.values.is_empty() {
            return Err(ConfigurationError::invalid_step(&self.name, "'values' must contain at least one key"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<Value, StepError> {
        for (key, value) in &self.params.values {
            ctx.set_data(key.clone(), value.clone());
        }
        Ok(Value::Object(self.params.values.clone()))
    }
}
