//! Reporte final de una ejecución.
//!
//! Se construye una sola vez al terminar el loop del orquestador (o al
//! abortar) y no se modifica después.

pub mod metrics;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use metrics::{HostProbe, NoopProbe, ResourceProbe, ResourceUsage};

use crate::model::ExecutionContext;
use crate::step::{StepState, StepStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub run_id: Uuid,
    pub definition_hash: String,
    /// `Completed` sólo si `summary.failed_steps == 0`.
    pub status: RunStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    /// En orden de declaración.
    pub steps: Vec<StepSummary>,
    pub summary: RunSummary,
    pub errors: Vec<ErrorSummary>,
    /// Steps que fallaron y luego recuperó un retry automático.
    pub retried_steps: Vec<String>,
    pub performance: PerformanceMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub name: String,
    pub status: StepStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub error: Option<String>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub failed_steps: usize,
    /// `completed / total * 100`.
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub step: String,
    pub message: String,
    pub attempt: u32,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_step_time_ms: i64,
    pub average_step_time_ms: f64,
    pub resources: ResourceUsage,
}

/// Vista de un step para armar el reporte.
pub(crate) struct StepView<'a> {
    pub name: &'a str,
    pub dependencies: &'a [String],
    pub state: &'a StepState,
}

pub(crate) fn assemble(ctx: &ExecutionContext,
                       steps: &[StepView<'_>],
                       definition_hash: &str,
                       retried_steps: &[String],
                       resources: ResourceUsage)
                       -> ExecutionReport {
    let meta = ctx.metadata();

    let step_summaries: Vec<StepSummary> = steps.iter()
                                                .map(|s| StepSummary { name: s.name.to_string(),
                                                                       status: s.state.status,
                                                                       start_time: s.state.start_time,
                                                                       end_time: s.state.end_time,
                                                                       duration_ms: s.state.duration_ms(),
                                                                       error: s.state.error.as_ref().map(|e| e.to_string()),
                                                                       dependencies: s.dependencies.to_vec() })
                                                .collect();

    let durations: Vec<i64> = step_summaries.iter().filter_map(|s| s.duration_ms).collect();
    let total_step_time_ms: i64 = durations.iter().sum();
    let average_step_time_ms = if durations.is_empty() {
        0.0
    } else {
        total_step_time_ms as f64 / durations.len() as f64
    };

    let success_rate = if meta.total_steps == 0 {
        0.0
    } else {
        meta.completed_steps as f64 / meta.total_steps as f64 * 100.0
    };

    let errors = ctx.errors()
                    .iter()
                    .map(|e| ErrorSummary { step: e.step.clone(),
                                            message: e.error.to_string(),
                                            attempt: e.attempt,
                                            at: e.at })
                    .collect();

    ExecutionReport { run_id: ctx.id(),
                      definition_hash: definition_hash.to_string(),
                      status: if meta.failed_steps == 0 { RunStatus::Completed } else { RunStatus::Failed },
                      start_time: meta.start_time,
                      end_time: meta.end_time,
                      duration_ms: meta.duration_ms(),
                      steps: step_summaries,
                      summary: RunSummary { total_steps: meta.total_steps,
                                            completed_steps: meta.completed_steps,
                                            failed_steps: meta.failed_steps,
                                            success_rate },
                      errors,
                      retried_steps: retried_steps.to_vec(),
                      performance: PerformanceMetrics { total_step_time_ms,
                                                        average_step_time_ms,
                                                        resources } }
}
