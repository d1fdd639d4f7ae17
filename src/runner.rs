//! Carga de definiciones desde disco y ejecución.
//!
//! Precedencia de la política de errores: flags de CLI > `error_handling` del
//! archivo > variables de entorno (`AppConfig`) > defaults del motor.

use std::fs;
use std::path::Path;

use pipeflow_adapters::{ErrorHandlingPatch, PipelineDefinition, StepRegistry};
use pipeflow_core::{ErrorHandlingConfig, ExecutionReport, RunStatus, WorkflowError};
use tracing::{info, warn};

use crate::errors::AppError;

pub const EXIT_COMPLETED: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ABORTED: i32 = 2;

/// Resultado de una ejecución que llegó a correr steps.
#[derive(Debug)]
pub struct Outcome {
    pub report: ExecutionReport,
    /// Causa del aborto, si lo hubo.
    pub abort: Option<String>,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match (&self.abort, self.report.status) {
            (Some(_), _) => EXIT_ABORTED,
            (None, RunStatus::Completed) => EXIT_COMPLETED,
            (None, RunStatus::Failed) => EXIT_FAILED,
        }
    }
}

pub fn load_definition(path: &Path) -> Result<PipelineDefinition, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(PipelineDefinition::from_json(&raw)?)
}

pub fn resolve_config(base: ErrorHandlingConfig, definition: &PipelineDefinition, cli: ErrorHandlingPatch) -> ErrorHandlingConfig {
    definition.error_handling.overridden_by(cli).apply(base)
}

/// Construye y ejecuta `definition`. Un aborto no es error: vuelve como
/// `Outcome` con el reporte parcial.
pub async fn run_definition(definition: &PipelineDefinition,
                            registry: &StepRegistry,
                            config: ErrorHandlingConfig)
                            -> Result<Outcome, AppError> {
    let mut orchestrator = definition.build_with(registry, config)?;
    info!(run_id = %orchestrator.run_id(), hash = orchestrator.definition_hash(), "executing pipeline");
    match orchestrator.execute().await {
        Ok(report) => Ok(Outcome { report,
                                   abort: None }),
        Err(WorkflowError::Aborted { step, source, report }) => {
            warn!(step = %step, error = %source, "pipeline aborted");
            Ok(Outcome { report: *report,
                         abort: Some(format!("aborted at step '{step}': {source}")) })
        }
        Err(err) => Err(err.into()),
    }
}

/// Lee `path`, resuelve la config y ejecuta con el registro por defecto.
pub async fn run_file(path: &Path, base: ErrorHandlingConfig, cli: ErrorHandlingPatch) -> Result<Outcome, AppError> {
    let definition = load_definition(path)?;
    let config = resolve_config(base, &definition, cli);
    run_definition(&definition, &StepRegistry::default(), config).await
}

pub fn render_report(report: &ExecutionReport, pretty: bool) -> Result<String, AppError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    Ok(rendered)
}
