//! Pipelines construidos desde JSON con los steps genéricos.

use pipeflow_adapters::{PipelineDefinition, StepRegistry};
use pipeflow_core::{ConfigurationError, RunStatus, StepStatus, WorkflowError};
use serde_json::json;

fn definition(value: serde_json::Value) -> PipelineDefinition {
    serde_json::from_value(value).expect("definition json")
}

#[tokio::test]
async fn seed_copy_guard_completes() {
    let def = definition(json!({
        "steps": [
            { "kind": "set_data", "name": "seed", "config": { "values": { "price": 10 } } },
            { "kind": "copy_data", "name": "copy", "config": { "from": "price", "to": "base" }, "dependencies": ["seed"] },
            { "kind": "require_keys", "name": "guard", "config": { "keys": ["price", "base"] }, "dependencies": ["copy"] }
        ]
    }));
    let mut orch = def.build(&StepRegistry::default()).expect("build");
    let report = orch.execute().await.expect("run");

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(orch.context().get_data("base"), Some(&json!(10)));
    assert_eq!(report.steps[1].dependencies, ["seed"]);
    assert_eq!(report.definition_hash, orch.definition_hash());
}

#[tokio::test]
async fn missing_key_falls_back_and_guard_still_runs() {
    let def = definition(json!({
        "steps": [
            { "kind": "set_data", "name": "seed", "config": { "values": { "rate": 1 } } },
            { "kind": "copy_data", "name": "copy", "config": { "from": "price", "to": "base" } },
            { "kind": "require_keys", "name": "guard", "config": { "keys": ["rate"] } }
        ]
    }));
    let mut orch = def.build(&StepRegistry::default()).expect("build");
    let report = orch.execute().await.expect("fallback continues");

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.summary.failed_steps, 1);
    assert_eq!(orch.context().get_data("copy_fallback"), Some(&json!(true)));
    assert_eq!(orch.step_state("guard").map(|s| s.status), Some(StepStatus::Completed));
}

#[tokio::test(start_paused = true)]
async fn transient_network_failure_is_retried() {
    let def = definition(json!({
        "error_handling": { "max_retries": 2, "retry_strategy": "fixed" },
        "steps": [
            { "kind": "set_data", "name": "seed", "config": { "values": { "a": 1 } } },
            { "kind": "fail", "name": "fetch", "config": { "error": "network", "message": "reset", "times": 1 } },
            { "kind": "require_keys", "name": "guard", "config": { "keys": ["a"] } }
        ]
    }));
    let mut orch = def.build(&StepRegistry::default()).expect("build");
    let report = orch.execute().await.expect("recovered");

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.retried_steps, ["fetch"]);
    assert_eq!(orch.context().get_step_output("fetch").map(|r| r.output.clone()), Some(json!({ "attempt": 2 })));
}

#[tokio::test]
async fn abort_when_fallback_disabled() {
    let def = definition(json!({
        "error_handling": { "max_retries": 0, "fallback_enabled": false },
        "steps": [
            { "kind": "set_data", "name": "seed", "config": { "values": { "a": 1 } } },
            { "kind": "fail", "name": "boom", "config": { "message": "Timeout talking to pricing" , "error": "other" } },
            { "kind": "set_data", "name": "never", "config": { "values": { "b": 2 } } }
        ]
    }));
    let mut orch = def.build(&StepRegistry::default()).expect("build");
    let err = orch.execute().await.expect_err("abort");

    assert_eq!(err.aborted_step(), Some("boom"));
    assert!(orch.context().get_data("b").is_none());
}

#[tokio::test]
async fn invalid_step_config_is_caught_before_running() {
    let def = definition(json!({
        "steps": [
            { "kind": "set_data", "name": "seed", "config": { "values": { "a": 1 } } },
            { "kind": "require_keys", "name": "guard", "config": { "keys": [] } },
            { "kind": "set_data", "name": "tail", "config": { "values": { "b": 2 } } }
        ]
    }));
    let mut orch = def.build(&StepRegistry::default()).expect("build");
    let err = orch.execute().await.expect_err("invalid config");

    assert!(matches!(err, WorkflowError::Configuration(ConfigurationError::InvalidStep { ref step, .. }) if step == "guard"));
    assert!(orch.context().get_data("a").is_none());
}
