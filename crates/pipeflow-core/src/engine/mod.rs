//! Engine module: orquestador, builder y estados de ejecución.

pub mod builder;
pub mod orchestrator;
mod state;

pub use builder::OrchestratorBuilder;
pub use orchestrator::Orchestrator;
pub use state::RunState;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::errors::{ConfigurationError, StepError, WorkflowError};
    use crate::event::RunEventKind;
    use crate::handling::{ErrorHandlingConfig, RetryStrategy};
    use crate::model::ExecutionContext;
    use crate::report::NoopProbe;
    use crate::step::Step;

    // Paso de ejemplo: escribe su nombre en el pizarrón
    struct Writer {
        name: String,
        cleaned: Arc<AtomicBool>,
    }

    impl Writer {
        fn new(name: &str) -> Self {
            Self { name: name.to_string(),
                   cleaned: Arc::new(AtomicBool::new(false)) }
        }
    }

    #[async_trait]
    impl Step for Writer {
        fn name(&self) -> &str {
            &self.name
        }

        async fn execute(&self, ctx: &mut ExecutionContext) -> Result<Value, StepError> {
            ctx.set_data(self.name.clone(), true);
            Ok(json!({ "wrote": self.name }))
        }

        fn cleanup(&self) {
            self.cleaned.store(true, Ordering::SeqCst);
        }
    }

    // Paso con configuración inválida
    struct Misconfigured;

    #[async_trait]
    impl Step for Misconfigured {
        fn name(&self) -> &str {
            "misconfigured"
        }

        fn check_config(&self) -> Result<(), ConfigurationError> {
            Err(ConfigurationError::invalid_step("misconfigured", "missing 'source'"))
        }

        async fn execute(&self, _ctx: &mut ExecutionContext) -> Result<Value, StepError> {
            Ok(Value::Null)
        }
    }

    fn config() -> ErrorHandlingConfig {
        ErrorHandlingConfig { max_retries: 0,
                              retry_strategy: RetryStrategy::Fixed,
                              fallback_enabled: true }
    }

    #[tokio::test]
    async fn builder_runs_steps_in_declaration_order() {
        let mut orchestrator = Orchestrator::builder(config()).step(Writer::new("a"))
                                                              .step(Writer::new("b"))
                                                              .step(Writer::new("c"))
                                                              .probe(NoopProbe)
                                                              .build();
        assert_eq!(orchestrator.state(), RunState::NotStarted);

        let report = orchestrator.execute().await.expect("run should complete");
        assert_eq!(orchestrator.state(), RunState::Completed);

        let names: Vec<&str> = orchestrator.context().step_outputs().keys().map(String::as_str).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(report.steps.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), ["a", "b", "c"]);
        assert!(orchestrator.context().metadata().end_time.is_some());
    }

    #[tokio::test]
    async fn events_follow_the_lifecycle() {
        let mut orchestrator = Orchestrator::new(vec![Box::new(Writer::new("a")), Box::new(Writer::new("b")), Box::new(Writer::new("c"))],
                                                 config());
        orchestrator.execute().await.expect("run");

        let kinds: Vec<&'static str> = orchestrator.events()
                                                   .iter()
                                                   .map(|e| match e.kind {
                                                       RunEventKind::RunStarted { .. } => "I",
                                                       RunEventKind::StepStarted { .. } => "S",
                                                       RunEventKind::StepFinished { .. } => "F",
                                                       RunEventKind::StepFailed { .. } => "X",
                                                       RunEventKind::StepRecovered { .. } => "R",
                                                       RunEventKind::FallbackApplied { .. } => "B",
                                                       RunEventKind::RunCompleted { .. } => "C",
                                                       RunEventKind::RunAborted { .. } => "A",
                                                   })
                                                   .collect();
        assert_eq!(kinds, ["I", "S", "F", "S", "F", "S", "F", "C"]);
    }

    #[tokio::test]
    async fn execute_twice_is_rejected() {
        let mut orchestrator = Orchestrator::new(vec![Box::new(Writer::new("a")), Box::new(Writer::new("b")), Box::new(Writer::new("c"))],
                                                 config());
        orchestrator.execute().await.expect("first run");
        let second = orchestrator.execute().await;
        assert!(matches!(second, Err(WorkflowError::AlreadyExecuted)));
    }

    #[tokio::test]
    async fn invalid_step_config_aborts_in_validation() {
        let mut orchestrator = Orchestrator::new(vec![Box::new(Writer::new("a")), Box::new(Misconfigured), Box::new(Writer::new("c"))],
                                                 config());
        let err = orchestrator.execute().await.expect_err("validation must fail");
        assert!(matches!(err, WorkflowError::Configuration(ConfigurationError::InvalidStep { .. })));
        assert_eq!(orchestrator.state(), RunState::Aborted);
        assert!(orchestrator.context().get_data("a").is_none());
        assert!(orchestrator.context().metadata().end_time.is_none());
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let orchestrator = Orchestrator::new(vec![Box::new(Writer::new("a")), Box::new(Writer::new("b")), Box::new(Writer::new("a"))],
                                             config());
        assert_eq!(orchestrator.validate_workflow(), Err(ConfigurationError::DuplicateStep("a".into())));
    }

    #[tokio::test]
    async fn cleanup_runs_for_started_steps() {
        let a = Writer::new("a");
        let flag = a.cleaned.clone();
        let mut orchestrator = Orchestrator::builder(config()).step(a)
                                                              .step(Writer::new("b"))
                                                              .step(Writer::new("c"))
                                                              .build();
        orchestrator.execute().await.expect("run");
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn definition_hash_depends_on_order() {
        let ab = Orchestrator::new(vec![Box::new(Writer::new("a")), Box::new(Writer::new("b")), Box::new(Writer::new("c"))], config());
        let ab_again = Orchestrator::new(vec![Box::new(Writer::new("a")), Box::new(Writer::new("b")), Box::new(Writer::new("c"))], config());
        let ba = Orchestrator::new(vec![Box::new(Writer::new("b")), Box::new(Writer::new("a")), Box::new(Writer::new("c"))], config());
        assert_eq!(ab.definition_hash(), ab_again.definition_hash());
        assert_ne!(ab.definition_hash(), ba.definition_hash());
    }
}
