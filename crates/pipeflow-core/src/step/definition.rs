use async_trait::async_trait;
use serde_json::Value;

use crate::errors::{ConfigurationError, StepError};
use crate::model::ExecutionContext;

/// Unidad de trabajo de un pipeline.
///
/// Sólo `name` y `execute` son obligatorios. Los steps se ejecutan de a uno:
/// `execute` recibe el contexto en exclusiva hasta que su futuro resuelve.
#[async_trait]
pub trait Step: Send + Sync {
    /// Identificador único dentro de la ejecución.
    fn name(&self) -> &str;

    /// Dependencias declaradas. Son sólo metadata: el orquestador nunca
    /// reordena ni bloquea steps en base a ellas.
    fn dependencies(&self) -> &[String] {
        &[]
    }

    /// Chequeo estático de configuración, antes de ejecutar cualquier step.
    fn check_config(&self) -> Result<(), ConfigurationError> {
        Ok(())
    }

    /// Valida/normaliza una entrada. Por defecto la identidad.
    fn validate(&self, input: Value) -> Result<Value, StepError> {
        Ok(input)
    }

    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<Value, StepError>;

    /// Liberación de recursos. Idempotente y nunca falla.
    fn cleanup(&self) {}
}
