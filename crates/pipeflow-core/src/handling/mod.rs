//! Manejo de fallos de steps: clasificación, retry con backoff y fallback.

pub mod backoff;
pub mod classify;
mod config;
pub mod handler;

pub use backoff::{Backoff, ParseStrategyError, RetryStrategy};
pub use classify::{ErrorInfo, ErrorKind, Severity};
pub use config::ErrorHandlingConfig;
pub use handler::{ErrorHandler, Resolution};

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::errors::StepError;
    use crate::model::ExecutionContext;
    use crate::step::Step;

    /// Falla `failures` veces con `error` y después devuelve "ok".
    struct Flaky {
        failures: u32,
        error: StepError,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32, error: StepError) -> Self {
            Self { failures,
                   error,
                   calls: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl Step for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn execute(&self, _ctx: &mut ExecutionContext) -> Result<Value, StepError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(self.error.clone())
            } else {
                Ok(json!("ok"))
            }
        }
    }

    fn config(max_retries: u32, fallback_enabled: bool) -> ErrorHandlingConfig {
        ErrorHandlingConfig { max_retries,
                              retry_strategy: RetryStrategy::Exponential,
                              fallback_enabled }
    }

    #[test]
    fn should_retry_rules() {
        let handler = ErrorHandler::new(config(2, true));
        let retryable = handler.classify(&StepError::Timeout("t".into()), "s");
        assert!(handler.should_retry(&retryable));

        let high = handler.classify(&StepError::other("weird"), "s");
        assert!(!handler.should_retry(&high));

        let not_flagged = handler.classify(&StepError::execution("x", false), "s");
        assert!(!handler.should_retry(&not_flagged));

        let no_budget = ErrorHandler::new(config(0, true));
        assert!(!no_budget.should_retry(&retryable));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_recovers_on_second_attempt() {
        let handler = ErrorHandler::new(config(2, true));
        let step = Flaky::new(2, StepError::Network("reset".into()));
        let mut ctx = ExecutionContext::new();

        // La primera llamada la hizo el orquestador.
        let first = step.execute(&mut ctx).await.expect_err("first call fails");
        let resolution = handler.handle(first, &step, &mut ctx).await;

        assert_eq!(resolution, Resolution::Recovered { output: json!("ok"), attempts: 2 });
        assert_eq!(step.calls.load(Ordering::SeqCst), 3);
        // El intento de retry fallido queda en el log.
        assert_eq!(ctx.errors().len(), 1);
        assert_eq!(ctx.errors()[0].attempt, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_waits_according_to_strategy() {
        let cfg = ErrorHandlingConfig { max_retries: 3,
                                        retry_strategy: RetryStrategy::Linear,
                                        fallback_enabled: true };
        let handler = ErrorHandler::new(cfg);
        let step = Flaky::new(u32::MAX, StepError::Timeout("slow".into()));
        let mut ctx = ExecutionContext::new();

        let start = tokio::time::Instant::now();
        let outcome = handler.retry(&step, &mut ctx).await;
        assert_eq!(outcome, Err(StepError::Timeout("slow".into())));
        // 1s + 2s + 3s
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(6) && waited < Duration::from_secs(7), "waited {waited:?}");
        assert_eq!(ctx.errors().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_fall_back() {
        let handler = ErrorHandler::new(config(2, true));
        let step = Flaky::new(u32::MAX, StepError::Network("down".into()));
        let mut ctx = ExecutionContext::new();

        let resolution = handler.handle(StepError::Network("down".into()), &step, &mut ctx).await;
        assert!(matches!(resolution, Resolution::FellBack { ref info, .. } if info.kind == ErrorKind::Network));
        assert_eq!(ctx.get_data("flaky_fallback"), Some(&json!("cached")));
        assert_eq!(step.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_retryable_without_fallback_is_unresolved() {
        let handler = ErrorHandler::new(config(3, false));
        let step = Flaky::new(u32::MAX, StepError::Validation("bad".into()));
        let mut ctx = ExecutionContext::new();

        let resolution = handler.handle(StepError::Validation("bad".into()), &step, &mut ctx).await;
        assert!(matches!(resolution, Resolution::Unresolved { ref error, .. } if *error == StepError::Validation("bad".into())));
        assert_eq!(step.calls.load(Ordering::SeqCst), 0);
        assert!(ctx.get_data("flaky_fallback").is_none());
    }

    #[test]
    fn fallback_side_effects() {
        let handler = ErrorHandler::new(config(0, true));
        let mut ctx = ExecutionContext::new();

        let validation = handler.classify(&StepError::Validation("x".into()), "rules");
        handler.fallback(&validation, "rules", &mut ctx);
        assert_eq!(ctx.get_data("rules_fallback"), Some(&json!(true)));

        let network = handler.classify(&StepError::other("network down"), "fetch");
        handler.fallback(&network, "fetch", &mut ctx);
        assert_eq!(ctx.get_data("fetch_fallback"), Some(&json!("cached")));

        let unknown = handler.classify(&StepError::other("??"), "calc");
        handler.fallback(&unknown, "calc", &mut ctx);
        assert!(ctx.get_data("calc_fallback").is_none());
        assert_eq!(ctx.data().len(), 2);
    }

    struct Instant0;
    impl Backoff for Instant0 {
        fn delay(&self, _attempt: u32) -> Duration {
            Duration::ZERO
        }
    }

    #[tokio::test]
    async fn custom_backoff_is_used() {
        let handler = ErrorHandler::with_backoff(config(1, true), Instant0);
        let step = Flaky::new(1, StepError::execution("transient", true));
        let mut ctx = ExecutionContext::new();
        let outcome = handler.retry(&step, &mut ctx).await;
        assert_eq!(outcome, Err(StepError::execution("transient", true)));
        let outcome = handler.retry(&step, &mut ctx).await;
        assert_eq!(outcome, Ok((json!("ok"), 1)));
    }
}
