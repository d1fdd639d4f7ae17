//! Builder para `Orchestrator`.
//!
//! ```ignore
//! let mut orchestrator = Orchestrator::builder(config)
//!     .step(LoadStep::new("load"))
//!     .step(ValidateStep::new("validate"))
//!     .step(FormatStep::new("format"))
//!     .build();
//! let report = orchestrator.execute().await?;
//! ```

use super::Orchestrator;
use crate::event::{EventStore, InMemoryEventStore};
use crate::handling::{Backoff, ErrorHandler, ErrorHandlingConfig};
use crate::report::{HostProbe, ResourceProbe};
use crate::step::Step;

pub struct OrchestratorBuilder<E: EventStore = InMemoryEventStore> {
    config: ErrorHandlingConfig,
    handler: ErrorHandler,
    steps: Vec<Box<dyn Step>>,
    event_store: E,
    probe: Box<dyn ResourceProbe>,
}

impl OrchestratorBuilder<InMemoryEventStore> {
    pub fn new(config: ErrorHandlingConfig) -> Self {
        Self { config,
               handler: ErrorHandler::new(config),
               steps: Vec::new(),
               event_store: InMemoryEventStore::default(),
               probe: Box::new(HostProbe) }
    }
}

impl<E: EventStore> OrchestratorBuilder<E> {
    /// Agrega un step al final del pipeline.
    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Box<dyn Step>>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Reemplaza el backoff derivado de `config.retry_strategy`.
    pub fn backoff(mut self, backoff: impl Backoff + 'static) -> Self {
        self.handler = ErrorHandler::with_backoff(self.config, backoff);
        self
    }

    pub fn probe(mut self, probe: impl ResourceProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Reemplaza el store de eventos (por defecto en memoria).
    pub fn event_store<S: EventStore>(self, event_store: S) -> OrchestratorBuilder<S> {
        OrchestratorBuilder { config: self.config,
                              handler: self.handler,
                              steps: self.steps,
                              event_store,
                              probe: self.probe }
    }

    pub fn build(self) -> Orchestrator<E> {
        Orchestrator::from_parts(self.steps, self.handler, self.event_store, self.probe)
    }
}
