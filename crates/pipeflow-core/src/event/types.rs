//! Eventos del ciclo de vida de una ejecución.
//!
//! El orquestador emite un evento por transición observable. El log es sólo
//! en memoria: sirve para inspeccionar el orden real de lo ocurrido, no para
//! reanudar ejecuciones.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handling::ErrorKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Validación superada; fija la cantidad de steps y el hash de la definición.
    RunStarted { definition_hash: String, step_count: usize },
    StepStarted { step_index: usize, step: String },
    StepFinished { step_index: usize, step: String, duration_ms: i64 },
    /// Fallo de la ejecución inicial de un step (antes de retry/fallback).
    StepFailed { step_index: usize, step: String, error: String },
    /// Un retry automático recuperó el step.
    StepRecovered { step_index: usize, step: String, attempts: u32 },
    FallbackApplied { step_index: usize, step: String, kind: ErrorKind },
    RunCompleted { completed_steps: usize, failed_steps: usize },
    /// `step` es None cuando el aborto ocurrió en validación.
    RunAborted { step: Option<String>, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>,
}
