//! Campos observables de un step durante una ejecución.
//!
//! El trait `Step` sólo describe comportamiento; el estado lo guarda el
//! orquestador en un `StepState` por step. `record_failure` es una función
//! libre: las implementaciones de `Step` no pueden reemplazarla.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::StepStatus;
use crate::errors::StepError;
use crate::model::{ExecutionContext, RecordedError};

#[derive(Debug, Clone, PartialEq)]
pub struct StepState {
    pub status: StepStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub error: Option<StepError>,
    pub output: Option<Value>,
}

impl Default for StepState {
    fn default() -> Self {
        Self { status: StepStatus::Pending,
               start_time: None,
               end_time: None,
               error: None,
               output: None }
    }
}

impl StepState {
    /// `end_time - start_time` una vez fijados ambos.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }

    pub(crate) fn mark_running(&mut self, at: DateTime<Utc>) {
        self.status = StepStatus::Running;
        self.start_time = Some(at);
        self.end_time = None;
    }

    pub(crate) fn mark_completed(&mut self, output: Value, at: DateTime<Utc>) {
        self.status = StepStatus::Completed;
        self.output = Some(output);
        self.end_time = Some(at);
    }

    /// Transición `Failed -> Completed` tras un retry exitoso. El error
    /// original se limpia del estado pero sigue en `ExecutionContext::errors`.
    pub(crate) fn mark_recovered(&mut self, output: Value, at: DateTime<Utc>) {
        self.error = None;
        self.mark_completed(output, at);
    }
}

/// Contabiliza el fallo de un step.
///
/// Fija `error`, `status = Failed` y `end_time`, agrega el error al log del
/// contexto e incrementa `failed_steps`. Se invoca una sola vez por step
/// fallido: los intentos de retry no pasan por aquí.
pub fn record_failure(state: &mut StepState, step_name: &str, error: &StepError, ctx: &mut ExecutionContext) {
    state.error = Some(error.clone());
    state.status = StepStatus::Failed;
    state.end_time = Some(Utc::now());
    ctx.record_error(RecordedError::new(step_name, error.clone(), 0));
    ctx.metadata.failed_steps += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_failure_updates_state_and_context() {
        let mut ctx = ExecutionContext::new();
        ctx.metadata.total_steps = 3;
        let mut state = StepState::default();
        state.mark_running(Utc::now());

        let err = StepError::Timeout("upstream slow".into());
        record_failure(&mut state, "fetch", &err, &mut ctx);

        assert_eq!(state.status, StepStatus::Failed);
        assert_eq!(state.error, Some(err.clone()));
        assert!(state.duration_ms().is_some());
        assert_eq!(ctx.metadata().failed_steps, 1);
        assert_eq!(ctx.errors().len(), 1);
        assert_eq!(ctx.errors()[0].step, "fetch");
        assert_eq!(ctx.errors()[0].error, err);
        assert_eq!(ctx.errors()[0].attempt, 0);
    }

    #[test]
    fn recovered_step_clears_error() {
        let mut state = StepState::default();
        state.mark_running(Utc::now());
        state.status = StepStatus::Failed;
        state.error = Some(StepError::Network("reset".into()));

        state.mark_recovered(serde_json::json!(42), Utc::now());
        assert_eq!(state.status, StepStatus::Completed);
        assert!(state.error.is_none());
        assert_eq!(state.output, Some(serde_json::json!(42)));
    }
}
