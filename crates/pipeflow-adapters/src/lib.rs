//! pipeflow-adapters: steps genéricos y definición serializable de pipelines.
//!
//! Este crate provee:
//! - Steps construibles desde `(name, config)` que ejercitan el contrato del
//!   core sin lógica de negocio (`set_data`, `copy_data`, `require_keys`,
//!   `fail`).
//! - Un `StepRegistry` que mapea `kind` → constructor.
//! - `PipelineDefinition`: JSON con la config de errores y la lista de steps,
//!   que se convierte en un `Orchestrator` listo para ejecutar.
//!
//! Nota: el core no conoce ningún step concreto; todo lo específico vive acá.

pub mod definition;
pub mod registry;
pub mod steps;

pub use definition::{ErrorHandlingPatch, PipelineDefinition, StepSpec};
pub use registry::{StepFactory, StepRegistry};
