use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contadores y marcas de tiempo de una ejecución.
///
/// Invariante: `completed_steps + failed_steps <= total_steps` en todo punto
/// observable. `end_time` sólo se fija cuando el loop del orquestador terminó.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub failed_steps: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl RunMetadata {
    pub fn is_consistent(&self) -> bool {
        self.completed_steps + self.failed_steps <= self.total_steps
    }

    /// Duración total en milisegundos (None hasta que el loop termine).
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}
