//! Modelos neutrales (ExecutionContext, metadata de la ejecución, registros).

pub mod context;
pub mod metadata;
pub mod record;

pub use context::ExecutionContext;
pub use metadata::RunMetadata;
pub use record::{RecordStatus, RecordedError, StepRecord};
