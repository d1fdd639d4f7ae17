use pipeflow_core::{ConfigurationError, WorkflowError};
use thiserror::Error;

/// Configuración, definición, IO o JSON inválidos.
pub const EXIT_INVALID: i32 = 3;

/// Errores del binario `pipeflow`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Definición inválida: {0}")]
    Definition(#[from] ConfigurationError),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl AppError {
    /// Código de salida del proceso. Todo `AppError` impidió arrancar o
    /// terminar la ejecución; los abortos llegan como `runner::Outcome`.
    pub fn exit_code(&self) -> i32 {
        EXIT_INVALID
    }
}
