//! Registros por step y entradas del log de errores.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Running,
    Completed,
    Failed,
}

/// Entrada de `ExecutionContext::step_outputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub status: RecordStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub output: Value,
    pub error: Option<String>,
    pub duration_ms: Option<i64>,
}

impl StepRecord {
    pub(crate) fn running(at: DateTime<Utc>) -> Self {
        Self { status: RecordStatus::Running,
               start_time: at,
               end_time: None,
               output: Value::Null,
               error: None,
               duration_ms: None }
    }

    /// Registro creado por `set_step_output` sin ciclo de vida previo: se
    /// asume éxito.
    pub(crate) fn completed_now(output: Value) -> Self {
        let now = Utc::now();
        Self { status: RecordStatus::Completed,
               start_time: now,
               end_time: Some(now),
               output,
               error: None,
               duration_ms: Some(0) }
    }
}

/// Un fallo observado durante la ejecución (incluidos los que luego resolvió
/// un retry). `attempt` es 0 para la ejecución inicial y `k + 1` para el
/// retry `k`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    pub step: String,
    pub error: StepError,
    pub attempt: u32,
    pub at: DateTime<Utc>,
}

impl RecordedError {
    pub fn new(step: impl Into<String>, error: StepError, attempt: u32) -> Self {
        Self { step: step.into(),
               error,
               attempt,
               at: Utc::now() }
    }
}
