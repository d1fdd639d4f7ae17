//! FailStep: falla a propósito con un `StepError` configurable.
//!
//! Con `times` falla sólo las primeras N invocaciones y después devuelve
//! `{"attempt": n}`; sirve para ejercitar retries desde una definición JSON.
//! Sin `times` falla siempre.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use pipeflow_core::{ConfigurationError, ExecutionContext, Step, StepError};
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_params;
use crate::definition::StepSpec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    #[default]
    Execution,
    Validation,
    Timeout,
    Network,
    /// Sin tipo: lo decide la heurística sobre el mensaje.
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FailParams {
    #[serde(default)]
    pub error: FailureKind,
    #[serde(default = "default_message")]
    pub message: String,
    /// Sólo aplica a `execution`.
    #[serde(default)]
    pub retryable: bool,
    #[serde(default)]
    pub times: Option<u32>,
}

fn default_message() -> String {
    "forced failure".to_string()
}

#[derive(Debug)]
pub struct FailStep {
    name: String,
    dependencies: Vec<String>,
    params: FailParams,
    calls: AtomicU32,
}

impl FailStep {
    pub fn new(name: impl Into<String>, error: FailureKind, message: impl Into<String>) -> Self {
        Self::with_params(name.into(),
                          Vec::new(),
                          FailParams { error,
                                       message: message.into(),
                                       retryable: false,
                                       times: None })
    }

    /// Falla sólo las primeras `times` invocaciones.
    pub fn transient(mut self, times: u32) -> Self {
        self.params.times = Some(times);
        self
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.params.retryable = retryable;
        self
    }

    pub fn from_spec(spec: &StepSpec) -> Result<Self, ConfigurationError> {
        Ok(Self::with_params(spec.name.clone(), spec.dependencies.clone(), parse_params(spec)?))
    }

    fn with_params(name: String, dependencies: Vec<String>, params: FailParams) -> Self {
        Self { name,
               dependencies,
               params,
               calls: AtomicU32::new(0) }
    }

    /// Invocaciones de `execute` hasta ahora.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn error(&self) -> StepError {
        let message = self.params.message.clone();
        match self.params.error {
            FailureKind::Execution => StepError::execution(message, self.params.retryable),
            FailureKind::Validation => StepError::Validation(message),
            FailureKind::Timeout => StepError::Timeout(message),
            FailureKind::Network => StepError::Network(message),
            FailureKind::Other => StepError::Other(message),
        }
    }
}

#[async_trait]
impl Step for FailStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    fn check_config(&self) -> Result<(), ConfigurationError> {
        if self.params.times == Some(0) {
            return Err(ConfigurationError::invalid_step(&self.name, "'times' must be at least 1"));
        }
        if self.params.retryable && self.params.error != FailureKind::Execution {
            return Err(ConfigurationError::invalid_step(&self.name, "'retryable' only applies to execution errors"));
        }
        Ok(())
    }

    async fn execute(&self, _ctx: &mut ExecutionContext) -> Result<Value, StepError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.params.times {
            Some(times) if attempt > times => Ok(json!({ "attempt": attempt })),
            _ => Err(self.error()),
        }
    }
}
