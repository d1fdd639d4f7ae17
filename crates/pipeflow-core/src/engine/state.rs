use serde::{Deserialize, Serialize};

/// Estado de una ejecución del orquestador.
///
/// `NotStarted -> Validating -> Running -> {Completed | Aborted}`, con
/// `Validating -> Aborted` cuando el pipeline es inválido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    NotStarted,
    Validating,
    Running,
    Completed,
    Aborted,
}
