use serde::{Deserialize, Serialize};

use super::RetryStrategy;

/// Política de manejo de errores. Se fija al construir el orquestador y no
/// cambia durante la ejecución.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorHandlingConfig {
    pub max_retries: u32,
    pub retry_strategy: RetryStrategy,
    pub fallback_enabled: bool,
}

impl Default for ErrorHandlingConfig {
    fn default() -> Self {
        Self { max_retries: 3,
               retry_strategy: RetryStrategy::Exponential,
               fallback_enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: ErrorHandlingConfig = serde_json::from_str(r#"{"retry_strategy": "fixed"}"#).expect("parse");
        assert_eq!(cfg.retry_strategy, RetryStrategy::Fixed);
        assert_eq!(cfg.max_retries, 3);
        assert!(cfg.fallback_enabled);
    }
}
