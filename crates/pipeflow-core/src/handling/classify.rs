//! Clasificación de fallos de steps.
//!
//! Primero se respeta la metadata estructurada del `StepError`. Sólo
//! `StepError::Other` (errores sin metadata) cae en la heurística por
//! substring del mensaje, que es imprecisa: "network" dentro de cualquier
//! texto alcanza para marcarlo como error de red.

use serde::{Deserialize, Serialize};

use crate::errors::StepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Execution,
    Validation,
    Timeout,
    Network,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub retryable: bool,
    pub origin_step: String,
}

impl ErrorInfo {
    fn new(kind: ErrorKind, severity: Severity, retryable: bool, origin_step: &str) -> Self {
        Self { kind,
               severity,
               retryable,
               origin_step: origin_step.to_string() }
    }
}

pub fn classify(error: &StepError, origin_step: &str) -> ErrorInfo {
    match error {
        StepError::Execution { retryable, .. } => ErrorInfo::new(ErrorKind::Execution, Severity::Medium, *retryable, origin_step),
        StepError::Validation(_) => ErrorInfo::new(ErrorKind::Validation, Severity::High, false, origin_step),
        StepError::Timeout(_) => ErrorInfo::new(ErrorKind::Timeout, Severity::Medium, true, origin_step),
        StepError::Network(_) => ErrorInfo::new(ErrorKind::Network, Severity::Medium, true, origin_step),
        StepError::Other(message) => classify_message(message, origin_step),
    }
}

fn classify_message(message: &str, origin_step: &str) -> ErrorInfo {
    let lowered = message.to_lowercase();
    if lowered.contains("validation") {
        ErrorInfo::new(ErrorKind::Validation, Severity::High, false, origin_step)
    } else if lowered.contains("timeout") {
        ErrorInfo::new(ErrorKind::Timeout, Severity::Medium, true, origin_step)
    } else if lowered.contains("network") {
        ErrorInfo::new(ErrorKind::Network, Severity::Medium, true, origin_step)
    } else {
        ErrorInfo::new(ErrorKind::Unknown, Severity::High, false, origin_step)
    }
}
