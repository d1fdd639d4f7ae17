//! Orquestador: ejecuta los steps en orden de declaración.
//!
//! Por cada step: marca `Running`, llama `execute`, y según el resultado
//! contabiliza éxito o pasa por `record_failure` + `ErrorHandler::handle`. Un
//! fallo no resuelto con fallback deshabilitado aborta la ejecución; con
//! fallback habilitado el loop sigue aunque los steps siguientes puedan ver
//! datos faltantes en el contexto.
//!
//! No hay timeout a nivel de orquestación: un `execute` que nunca resuelve
//! bloquea la ejecución completa.

use std::collections::HashSet;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::{OrchestratorBuilder, RunState};
use crate::constants::{ENGINE_VERSION, MIN_PIPELINE_STEPS};
use crate::errors::{ConfigurationError, StepError, WorkflowError};
use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
use crate::handling::{ErrorHandler, ErrorHandlingConfig, Resolution};
use crate::hashing::hash_value;
use crate::model::ExecutionContext;
use crate::report::{self, ExecutionReport, HostProbe, ResourceProbe, StepView};
use crate::step::{record_failure, Step, StepState};

struct StepSlot {
    step: Box<dyn Step>,
    state: StepState,
}

pub struct Orchestrator<E = InMemoryEventStore>
    where E: EventStore
{
    steps: Vec<StepSlot>,
    context: ExecutionContext,
    handler: ErrorHandler,
    event_store: E,
    probe: Box<dyn ResourceProbe>,
    state: RunState,
    definition_hash: String,
    retried_steps: Vec<String>,
}

impl Orchestrator<InMemoryEventStore> {
    /// Orquestador con store de eventos en memoria y `HostProbe`.
    pub fn new(steps: Vec<Box<dyn Step>>, config: ErrorHandlingConfig) -> Self {
        Self::from_parts(steps, ErrorHandler::new(config), InMemoryEventStore::default(), Box::new(HostProbe))
    }

    pub fn builder(config: ErrorHandlingConfig) -> OrchestratorBuilder<InMemoryEventStore> {
        OrchestratorBuilder::new(config)
    }
}

impl<E> Orchestrator<E> where E: EventStore
{
    pub(crate) fn from_parts(steps: Vec<Box<dyn Step>>,
                             handler: ErrorHandler,
                             event_store: E,
                             probe: Box<dyn ResourceProbe>)
                             -> Self {
        let definition_hash = definition_hash(&steps);
        let mut context = ExecutionContext::new();
        context.metadata.total_steps = steps.len();
        let steps = steps.into_iter()
                         .map(|step| StepSlot { step,
                                                state: StepState::default() })
                         .collect();
        Self { steps,
               context,
               handler,
               event_store,
               probe,
               state: RunState::NotStarted,
               definition_hash,
               retried_steps: Vec::new() }
    }

    pub fn run_id(&self) -> Uuid {
        self.context.id()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn config(&self) -> &ErrorHandlingConfig {
        self.handler.config()
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    /// Estado observable de un step por nombre.
    pub fn step_state(&self, name: &str) -> Option<&StepState> {
        self.steps.iter().find(|s| s.step.name() == name).map(|s| &s.state)
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    /// Eventos de esta ejecución en orden de emisión.
    pub fn events(&self) -> Vec<RunEvent> {
        self.event_store.list(self.run_id())
    }

    /// Falla si el pipeline está vacío, tiene menos de `MIN_PIPELINE_STEPS`
    /// steps, repite nombres o algún step rechaza su propia configuración.
    pub fn validate_workflow(&self) -> Result<(), ConfigurationError> {
        if self.steps.is_empty() {
            return Err(ConfigurationError::EmptyPipeline);
        }
        if self.steps.len() < MIN_PIPELINE_STEPS {
            return Err(ConfigurationError::TooFewSteps { min: MIN_PIPELINE_STEPS,
                                                         actual: self.steps.len() });
        }
        let mut seen = HashSet::new();
        for slot in &self.steps {
            let name = slot.step.name();
            if name.trim().is_empty() {
                return Err(ConfigurationError::invalid_step(name, "step name must not be empty"));
            }
            if !seen.insert(name) {
                return Err(ConfigurationError::DuplicateStep(name.to_string()));
            }
            slot.step.check_config()?;
        }
        Ok(())
    }

    /// Ejecuta el pipeline completo.
    ///
    /// Devuelve el reporte salvo en dos casos: configuración inválida (ningún
    /// step se ejecuta) o aborto por fallo con fallback deshabilitado. El
    /// `status` del reporte refleja `failed_steps`, no si hubo aborto.
    pub async fn execute(&mut self) -> Result<ExecutionReport, WorkflowError> {
        if self.state != RunState::NotStarted {
            return Err(WorkflowError::AlreadyExecuted);
        }
        let span = info_span!("run", run_id = %self.run_id());
        self.run().instrument(span).await
    }

    /// Snapshot del reporte con el estado actual.
    pub fn report(&self) -> ExecutionReport {
        let views: Vec<StepView<'_>> = self.steps
                                           .iter()
                                           .map(|s| StepView { name: s.step.name(),
                                                               dependencies: s.step.dependencies(),
                                                               state: &s.state })
                                           .collect();
        report::assemble(&self.context, &views, &self.definition_hash, &self.retried_steps, self.probe.sample())
    }

    async fn run(&mut self) -> Result<ExecutionReport, WorkflowError> {
        let run_id = self.run_id();
        self.context.metadata.start_time = Some(Utc::now());

        self.state = RunState::Validating;
        if let Err(err) = self.validate_workflow() {
            error!(error = %err, "pipeline validation failed");
            self.state = RunState::Aborted;
            self.event_store.append_kind(run_id,
                                         RunEventKind::RunAborted { step: None,
                                                                    reason: err.to_string() });
            return Err(err.into());
        }

        self.state = RunState::Running;
        self.event_store.append_kind(run_id,
                                     RunEventKind::RunStarted { definition_hash: self.definition_hash.clone(),
                                                                step_count: self.steps.len() });
        info!(steps = self.steps.len(), config = ?self.handler.config(), "run started");

        for index in 0..self.steps.len() {
            if let Err((step, cause)) = self.run_step(index).await {
                self.finish(RunState::Aborted);
                error!(step = %step, error = %cause, "run aborted");
                self.event_store.append_kind(run_id,
                                             RunEventKind::RunAborted { step: Some(step.clone()),
                                                                        reason: cause.to_string() });
                return Err(WorkflowError::Aborted { step,
                                                    source: cause,
                                                    report: Box::new(self.report()) });
            }
        }

        self.finish(RunState::Completed);
        let meta = self.context.metadata();
        let (completed_steps, failed_steps) = (meta.completed_steps, meta.failed_steps);
        self.event_store.append_kind(run_id,
                                     RunEventKind::RunCompleted { completed_steps,
                                                                  failed_steps });
        info!(completed_steps, failed_steps, "run finished");
        Ok(self.report())
    }

    /// Ejecuta el step `index`. `Err` sólo cuando corresponde abortar.
    async fn run_step(&mut self, index: usize) -> Result<(), (String, StepError)> {
        let run_id = self.run_id();
        let Self { steps,
                   context,
                   handler,
                   event_store,
                   retried_steps,
                   .. } = self;
        let slot = &mut steps[index];
        let name = slot.step.name().to_string();

        let started = Utc::now();
        slot.state.mark_running(started);
        context.begin_step(&name, started);
        event_store.append_kind(run_id,
                                RunEventKind::StepStarted { step_index: index,
                                                            step: name.clone() });
        debug!(step = %name, index, "step started");

        let failure = match slot.step.execute(context).await {
            Ok(output) => {
                let finished = Utc::now();
                slot.state.mark_completed(output.clone(), finished);
                context.complete_step(&name, output, finished);
                context.metadata.completed_steps += 1;
                let duration_ms = slot.state.duration_ms().unwrap_or_default();
                event_store.append_kind(run_id,
                                        RunEventKind::StepFinished { step_index: index,
                                                                     step: name.clone(),
                                                                     duration_ms });
                debug!(step = %name, duration_ms, "step completed");
                return Ok(());
            }
            Err(err) => err,
        };

        record_failure(&mut slot.state, &name, &failure, context);
        context.fail_step(&name, &failure, slot.state.end_time.unwrap_or_else(Utc::now));
        event_store.append_kind(run_id,
                                RunEventKind::StepFailed { step_index: index,
                                                           step: name.clone(),
                                                           error: failure.to_string() });
        warn!(step = %name, error = %failure, "step failed");

        match handler.handle(failure, slot.step.as_ref(), context).await {
            Resolution::Recovered { output, attempts } => {
                let finished = Utc::now();
                slot.state.mark_recovered(output.clone(), finished);
                context.complete_step(&name, output, finished);
                // La falla inicial ya no cuenta: el step terminó bien.
                context.metadata.failed_steps = context.metadata.failed_steps.saturating_sub(1);
                context.metadata.completed_steps += 1;
                retried_steps.push(name.clone());
                event_store.append_kind(run_id,
                                        RunEventKind::StepRecovered { step_index: index,
                                                                      step: name.clone(),
                                                                      attempts });
                info!(step = %name, attempts, "step recovered by retry");
                Ok(())
            }
            Resolution::FellBack { info, error } => {
                settle_failure(&mut slot.state, context, &name, &error);
                event_store.append_kind(run_id,
                                        RunEventKind::FallbackApplied { step_index: index,
                                                                        step: name,
                                                                        kind: info.kind });
                Ok(())
            }
            Resolution::Unresolved { error, .. } => {
                settle_failure(&mut slot.state, context, &name, &error);
                Err((name, error))
            }
        }
    }

    fn finish(&mut self, state: RunState) {
        self.context.metadata.end_time = Some(Utc::now());
        self.state = state;
        // Todo step que arrancó ya quedó en estado terminal.
        for slot in self.steps.iter().filter(|s| s.state.status.is_terminal()) {
            slot.step.cleanup();
        }
    }
}

/// Fija el error final (el último intento, si hubo retries) en el estado y
/// en el registro del step.
fn settle_failure(state: &mut StepState, ctx: &mut ExecutionContext, name: &str, error: &StepError) {
    let at = Utc::now();
    state.error = Some(error.clone());
    state.end_time = Some(at);
    ctx.fail_step(name, error, at);
}

fn definition_hash(steps: &[Box<dyn Step>]) -> String {
    let shape: Vec<_> = steps.iter()
                             .map(|s| json!({ "name": s.name(), "dependencies": s.dependencies() }))
                             .collect();
    hash_value(&json!({ "engine_version": ENGINE_VERSION, "steps": shape }))
}
