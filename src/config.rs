//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
//!
//! Variables reconocidas:
//! - `PIPEFLOW_MAX_RETRIES`: reintentos por step (entero >= 0).
//! - `PIPEFLOW_RETRY_STRATEGY`: `exponential` | `linear` | `fixed`.
//! - `PIPEFLOW_FALLBACK`: `true`/`false` (también `1`/`0`, `yes`/`no`, `on`/`off`).
//! - `PIPEFLOW_LOG`: filtro de `tracing` cuando `RUST_LOG` no está definido.
use std::env;

use once_cell::sync::Lazy;
use pipeflow_core::{ErrorHandlingConfig, RetryStrategy};

use crate::errors::AppError;

pub const ENV_MAX_RETRIES: &str = "PIPEFLOW_MAX_RETRIES";
pub const ENV_RETRY_STRATEGY: &str = "PIPEFLOW_RETRY_STRATEGY";
pub const ENV_FALLBACK: &str = "PIPEFLOW_FALLBACK";
pub const ENV_LOG: &str = "PIPEFLOW_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base de la política de errores; la definición y la CLI la pisan.
    pub error_handling: ErrorHandlingConfig,
    /// Filtro de logs por defecto.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { error_handling: ErrorHandlingConfig::default(),
               log_filter: DEFAULT_LOG_FILTER.to_string() }
    }
}

impl AppConfig {
    /// Lee `.env` (si existe) y las variables del proceso.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la config a partir de una función de lookup. Las variables
    /// ausentes o vacías toman el default; las mal formadas son error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let max_retries = match get(ENV_MAX_RETRIES) {
            Some(raw) => raw.parse::<u32>()
                            .map_err(|_| AppError::Config(format!("{ENV_MAX_RETRIES}='{raw}' is not a non-negative integer")))?,
            None => defaults.error_handling.max_retries,
        };
        let retry_strategy = match get(ENV_RETRY_STRATEGY) {
            Some(raw) => raw.parse::<RetryStrategy>()
                            .map_err(|e| AppError::Config(format!("{ENV_RETRY_STRATEGY}: {e}")))?,
            None => defaults.error_handling.retry_strategy,
        };
        let fallback_enabled = match get(ENV_FALLBACK) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| AppError::Config(format!("{ENV_FALLBACK}='{raw}' is not a boolean")))?,
            None => defaults.error_handling.fallback_enabled,
        };
        let log_filter = get(ENV_LOG).unwrap_or(defaults.log_filter);

        Ok(Self { error_handling: ErrorHandlingConfig { max_retries,
                                                        retry_strategy,
                                                        fallback_enabled },
                  log_filter })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
/// Un valor mal formado queda como error: el binario termina con código 3
/// en vez de correr con una política distinta de la pedida.
pub static CONFIG: Lazy<Result<AppConfig, AppError>> = Lazy::new(AppConfig::from_env);
