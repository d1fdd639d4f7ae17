//! pipeflow-core: motor secuencial de pipelines.
//!
//! Ejecuta una lista ordenada de steps opacos sobre un `ExecutionContext`
//! compartido, lleva el estado por step y agregado, y aplica la política de
//! clasificación / retry / fallback cuando un step falla.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod handling;
pub mod hashing;
pub mod model;
pub mod report;
pub mod step;

pub use engine::{Orchestrator, OrchestratorBuilder, RunState};
pub use errors::{ConfigurationError, StepError, WorkflowError};
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use handling::{Backoff, ErrorHandler, ErrorHandlingConfig, ErrorInfo, ErrorKind, Resolution, RetryStrategy, Severity};
pub use model::{ExecutionContext, RecordStatus, RecordedError, RunMetadata, StepRecord};
pub use report::{ExecutionReport, RunStatus};
pub use step::{record_failure, Step, StepState, StepStatus};
