//! RequireKeysStep: falla si faltan claves en el contexto.

use async_trait::async_trait;
use pipeflow_core::{ConfigurationError, ExecutionContext, Step, StepError};
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_params;
use crate::definition::StepSpec;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequireKeysParams {
    pub keys: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RequireKeysStep {
    name: String,
    dependencies: Vec<String>,
    params: RequireKeysParams,
}

impl RequireKeysStep {
    pub fn new(name: impl Into<String>, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { name: name.into(),
               dependencies: Vec::new(),
               params: RequireKeysParams { keys: keys.into_iter().map(Into::into).collect() } }
    }

    pub fn from_spec(spec: &StepSpec) -> Result<Self, ConfigurationError> {
        Ok(Self { name: spec.name.clone(),
                  dependencies: spec.dependencies.clone(),
                  params: parse_params(spec)? })
    }
}

#[async_trait]
impl Step for RequireKeysStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    fn check_config(&self) -> Result<(), ConfigurationError> {
        if self.params.keys.is_empty() {
            return Err(ConfigurationError::invalid_step(&self.name, "'keys' must not be empty"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<Value, StepError> {
        let missing: Vec<&str> = self.params
                                     .keys
                                     .iter()
                                     .filter(|k| ctx.get_data(k).is_none())
                                     .map(String::as_str)
                                     .collect();
        if !missing.is_empty() {
            return Err(StepError::Validation(format!("missing required keys: {}", missing.join(", "))));
        }
        Ok(json!({ "checked": self.params.keys.len() }))
    }
}
