//! Definiciones relacionadas a Steps.
//!
//! - `Step`: contrato polimórfico que implementan las variantes de negocio.
//! - `StepState` / `StepStatus`: campos observables que mantiene el orquestador.
//! - `record_failure`: contabilidad de fallos, no sobreescribible.

pub mod definition;
mod state;
mod status;

pub use definition::Step;
pub use state::{record_failure, StepState};
pub use status::StepStatus;
