//! CopyDataStep: copia un valor del contexto bajo otra clave.
//!
//! Falla con `StepError::Validation` si la clave origen no existe o el valor
//! es `null` y `allow_null` es falso. Con fallback habilitado eso deja
//! `<name>_fallback = true` y el pipeline sigue sin la clave destino.

use async_trait::async_trait;
use pipeflow_core::{ConfigurationError, ExecutionContext, Step, StepError};
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_params;
use crate::definition::StepSpec;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyDataParams {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub allow_null: bool,
}

#[derive(Debug, Clone)]
pub struct CopyDataStep {
    name: String,
    dependencies: Vec<String>,
    params: CopyDataParams,
}

impl CopyDataStep {
    pub fn new(name: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { name: name.into(),
               dependencies: Vec::new(),
               params: CopyDataParams { from: from.into(),
                                        to: to.into(),
                                        allow_null: false } }
    }

    pub fn from_spec(spec: &StepSpec) -> Result<Self, ConfigurationError> {
        Ok(Self { name: spec.name.clone(),
                  dependencies: spec.dependencies.clone(),
                  params: parse_params(spec)? })
    }
}

#[async_trait]
impl Step for CopyDataStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    fn check_config(&self) -> Result<(), ConfigurationError> {
        let CopyDataParams { from, to, .. } = &self.params;
        if from.is_empty() || to.is_empty() {
            return Err(ConfigurationError::invalid_step(&self.name, "'from' and 'to' must not be empty"));
        }
        if from == to {
            return Err(ConfigurationError::invalid_step(&self.name, "'from' and 'to' must differ"));
        }
        Ok(())
    }

    fn validate(&self, input: Value) -> Result<Value, StepError> {
        if input.is_null() && !self.params.allow_null {
            return Err(StepError::Validation(format!("'{}' is null", self.params.from)));
        }
        Ok(input)
    }

    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<Value, StepError> {
        let source = ctx.get_data(&self.params.from)
                        .cloned()
                        .ok_or_else(|| StepError::Validation(format!("missing key '{}'", self.params.from)))?;
        let value = self.validate(source)?;
        ctx.set_data(self.params.to.clone(), value.clone());
        Ok(json!({ "from": self.params.from, "to": self.params.to, "value": value }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copies_existing_key() {
        let mut ctx = ExecutionContext::new();
        ctx.set_data("price", 10.5);
        let step = CopyDataStep::new("copy", "price", "base_price");
        step.execute(&mut ctx).await.expect("copy ok");
        assert_eq!(ctx.get_data("base_price"), Some(&json!(10.5)));
    }

    #[tokio::test]
    async fn missing_source_is_a_validation_error() {
        let mut ctx = ExecutionContext::new();
        let step = CopyDataStep::new("copy", "price", "base_price");
        let err = step.execute(&mut ctx).await.expect_err("missing key");
        assert_eq!(err, StepError::Validation("missing key 'price'".into()));
        assert!(ctx.get_data("base_price").is_none());
    }

    #[tokio::test]
    async fn null_needs_allow_null() {
        let mut ctx = ExecutionContext::new();
        ctx.set_data("price", Value::Null);
        let step = CopyDataStep::new("copy", "price", "base_price");
        assert!(matches!(step.execute(&mut ctx).await, Err(StepError::Validation(_))));
    }

    #[test]
    fn same_source_and_target_is_invalid() {
        let step = CopyDataStep::new("copy", "price", "price");
        assert!(step.check_config().is_err());
    }
}
