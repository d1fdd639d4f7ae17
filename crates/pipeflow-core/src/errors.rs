//! Errores del motor.
//!
//! Tres familias bien separadas:
//! - `ConfigurationError`: el pipeline es inválido y no llega a ejecutarse.
//! - `StepError`: fallo local de un step; lo clasifica el `ErrorHandler`.
//! - `WorkflowError`: lo único que escapa de `Orchestrator::execute`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::ExecutionReport;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("pipeline has no steps")]
    EmptyPipeline,
    #[error("pipeline needs at least {min} steps, got {actual}")]
    TooFewSteps { min: usize, actual: usize },
    #[error("duplicate step name '{0}'")]
    DuplicateStep(String),
    #[error("step '{step}' has invalid configuration: {reason}")]
    InvalidStep { step: String, reason: String },
    #[error("unknown step kind '{0}'")]
    UnknownKind(String),
}

impl ConfigurationError {
    pub fn invalid_step(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidStep { step: step.into(),
                            reason: reason.into() }
    }
}

/// Fallo de un step.
///
/// Las variantes estructuradas llevan su tipo desde el punto de creación.
/// `Other` queda para errores que llegan sin metadata (IO, librerías de
/// terceros); esos se clasifican por heurística sobre el mensaje.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepError {
    #[error("execution failed: {message}")]
    Execution { message: String, retryable: bool },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Other(String),
}

impl StepError {
    pub fn execution(message: impl Into<String>, retryable: bool) -> Self {
        Self::Execution { message: message.into(),
                          retryable }
    }

    pub fn other(message: impl std::fmt::Display) -> Self {
        Self::Other(message.to_string())
    }
}

impl From<std::io::Error> for StepError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for StepError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid pipeline: {0}")]
    Configuration(#[from] ConfigurationError),
    /// Fallo no resuelto con `fallback_enabled == false`. Lleva el reporte
    /// parcial de lo ejecutado hasta el aborto.
    #[error("workflow aborted at step '{step}': {source}")]
    Aborted {
        step: String,
        #[source]
        source: StepError,
        report: Box<ExecutionReport>,
    },
    #[error("workflow already executed")]
    AlreadyExecuted,
}

impl WorkflowError {
    /// Nombre del step que provocó el aborto, si aplica.
    pub fn aborted_step(&self) -> Option<&str> {
        match self {
            Self::Aborted { step, .. } => Some(step),
            _ => None,
        }
    }
}
