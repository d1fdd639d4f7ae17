//! `ErrorHandler`: clasifica, reintenta y aplica fallback.
//!
//! Flujo de `handle` para un fallo ya contabilizado por `record_failure`:
//! 1. `classify`.
//! 2. Si `should_retry`, hasta `max_retries` reintentos con espera previa
//!    según la estrategia; el primer éxito devuelve `Recovered`.
//! 3. Sin retry (o agotados): con fallback habilitado se aplica `fallback` y
//!    se devuelve `FellBack`; si no, `Unresolved` y decide el orquestador.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use super::classify::{classify, ErrorInfo, ErrorKind, Severity};
use super::{Backoff, ErrorHandlingConfig};
use crate::constants::{CACHED_FALLBACK_MARKER, FALLBACK_KEY_SUFFIX};
use crate::errors::StepError;
use crate::model::{ExecutionContext, RecordedError};
use crate::step::Step;

/// Resultado del manejo de un fallo.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Un reintento tuvo éxito. `attempts` cuenta sólo los reintentos.
    Recovered { output: Value, attempts: u32 },
    /// No hubo recuperación y se aplicó el fallback; la ejecución sigue.
    FellBack { info: ErrorInfo, error: StepError },
    /// No hubo recuperación y el fallback está deshabilitado.
    Unresolved { info: ErrorInfo, error: StepError },
}

pub struct ErrorHandler {
    config: ErrorHandlingConfig,
    backoff: Box<dyn Backoff>,
}

impl std::fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandler").field("config", &self.config).finish_non_exhaustive()
    }
}

impl ErrorHandler {
    /// Handler con el backoff de `config.retry_strategy`.
    pub fn new(config: ErrorHandlingConfig) -> Self {
        Self { config,
               backoff: Box::new(config.retry_strategy) }
    }

    /// Handler con un backoff propio (ignora `config.retry_strategy`).
    pub fn with_backoff(config: ErrorHandlingConfig, backoff: impl Backoff + 'static) -> Self {
        Self { config,
               backoff: Box::new(backoff) }
    }

    pub fn config(&self) -> &ErrorHandlingConfig {
        &self.config
    }

    pub fn classify(&self, error: &StepError, origin_step: &str) -> ErrorInfo {
        classify(error, origin_step)
    }

    pub fn should_retry(&self, info: &ErrorInfo) -> bool {
        info.retryable && info.severity != Severity::High && self.config.max_retries > 0
    }

    pub async fn handle(&self, error: StepError, step: &dyn Step, ctx: &mut ExecutionContext) -> Resolution {
        let info = self.classify(&error, step.name());
        debug!(step = step.name(), kind = ?info.kind, severity = ?info.severity, retryable = info.retryable, "classified failure");

        let error = if self.should_retry(&info) {
            match self.retry(step, ctx).await {
                Ok((output, attempts)) => return Resolution::Recovered { output, attempts },
                Err(last) => last,
            }
        } else {
            error
        };

        if self.config.fallback_enabled {
            self.fallback(&info, step.name(), ctx);
            Resolution::FellBack { info, error }
        } else {
            Resolution::Unresolved { info, error }
        }
    }

    /// Reintenta `step` hasta `max_retries` veces, esperando
    /// `backoff.delay(k)` antes del intento `k`. Los fallos de cada intento
    /// van al log del contexto sin tocar contadores. Devuelve la salida y la
    /// cantidad de reintentos usados, o el último error.
    ///
    /// Llamar sólo con `max_retries > 0`.
    pub async fn retry(&self, step: &dyn Step, ctx: &mut ExecutionContext) -> Result<(Value, u32), StepError> {
        let mut last_error = None;
        for attempt in 0..self.config.max_retries {
            let delay = self.backoff.delay(attempt);
            warn!(step = step.name(), attempt = attempt + 1, delay_ms = delay_millis(delay), "retrying step");
            tokio::time::sleep(delay).await;

            match step.execute(ctx).await {
                Ok(output) => return Ok((output, attempt + 1)),
                Err(err) => {
                    ctx.record_error(RecordedError::new(step.name(), err.clone(), attempt + 1));
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| StepError::execution("retry requested with max_retries = 0", false)))
    }

    /// Efecto compensatorio según el tipo de fallo. Nunca falla.
    pub fn fallback(&self, info: &ErrorInfo, step_name: &str, ctx: &mut ExecutionContext) {
        let key = format!("{step_name}{FALLBACK_KEY_SUFFIX}");
        match info.kind {
            ErrorKind::Validation => {
                warn!(step = step_name, "validation fallback: continuing with degraded data");
                ctx.set_data(key, true);
            }
            ErrorKind::Network => {
                warn!(step = step_name, "network fallback: downstream should prefer cached data");
                ctx.set_data(key, CACHED_FALLBACK_MARKER);
            }
            _ => {
                warn!(step = step_name, kind = ?info.kind, "no fallback action, failure kept in error log");
            }
        }
    }
}

/// Milisegundos de `delay`, saturando en `u64::MAX`.
fn delay_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handling::RetryStrategy;

    #[test]
    fn delay_millis_saturates_for_huge_backoffs() {
        assert_eq!(delay_millis(Duration::from_secs(2)), 2_000);
        assert_eq!(delay_millis(RetryStrategy::Exponential.delay(200)), u64::MAX);
    }
}
