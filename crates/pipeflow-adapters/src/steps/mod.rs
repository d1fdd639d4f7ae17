//! Steps genéricos.
//!
//! Cada step se construye con `from_spec`, que parsea `config` en un struct
//! de parámetros tipado (serde). Un parámetro mal formado es un
//! `ConfigurationError::InvalidStep` antes de ejecutar nada.

pub mod copy_data;
pub mod fail;
pub mod require_keys;
pub mod set_data;

pub use copy_data::CopyDataStep;
pub use fail::{FailStep, FailureKind};
pub use require_keys::RequireKeysStep;
pub use set_data::SetDataStep;

use pipeflow_core::ConfigurationError;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::definition::StepSpec;

/// Parsea `spec.config` en `P`.
pub(crate) fn parse_params<P>(spec: &StepSpec) -> Result<P, ConfigurationError>
    where P: DeserializeOwned
{
    serde_json::from_value(Value::Object(spec.config.clone())).map_err(|e| ConfigurationError::invalid_step(&spec.name, e.to_string()))
}
