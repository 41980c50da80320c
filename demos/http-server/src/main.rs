use std::sync::Arc;

use serde_json::json;
use tracing::info;

use tg_api::{EngineAdapter, HttpApi};
use tg_core::{AdmissionEngine, CoreState, Registry, TerminationBus};
use tg_model::{TaskQueue, TaskTypeDraft, TaskWhitelist};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1) Logging
    let cfg = tg_observe::LogConfig::from_env();
    tg_observe::init_logging(&cfg)?;
    info!("logging initialized");

    // 2) Shared state + termination bus
    let state = CoreState::new();
    let (bus, mut terminations) = TerminationBus::channel();

    // Stand-in executor: log termination requests as they arrive. A real
    // deployment attaches its worker fleet here.
    tokio::spawn(async move {
        while let Some(uuid) = terminations.recv().await {
            info!(%uuid, "executor received termination request");
        }
    });

    // 3) Seed a demo queue, whitelist and task type
    seed(&state)?;

    // 4) HTTP API
    let adapter = Arc::new(EngineAdapter::new(state, bus));
    let router = HttpApi::new(adapter).router();

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    info!("listening on {}", listener.local_addr()?);
    info!("press Ctrl+C to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down...");
        })
        .await?;

    Ok(())
}

/// Register a `sleeper` task type, whitelist it, and open the `default`
/// queue for it, so the API is usable straight away.
fn seed(state: &CoreState) -> Result<(), tg_core::CoreError> {
    let registry = Registry::new(state.clone());

    let task_type = registry.register_task_type(
        TaskTypeDraft {
            name: "sleeper".to_string(),
            description: "sleep for a configurable number of seconds".to_string(),
            command_to_run: "sleep".to_string(),
            required_arguments: Some(json!(["duration"])),
            required_arguments_default_values: Some(json!({"duration": 10})),
            ..TaskTypeDraft::default()
        },
        Some("demo".to_string()),
    )?;

    let mut whitelist = TaskWhitelist::new("demo-whitelist", Some("demo".to_string()));
    whitelist.add_executable(task_type.id.clone());
    registry.create_whitelist(whitelist)?;

    let mut queue = TaskQueue::new("default", Some("demo".to_string()));
    queue.whitelists = vec!["demo-whitelist".to_string()];
    registry.create_queue(queue)?;

    // Prove the pipeline end to end once at startup.
    let engine = AdmissionEngine::new(state.clone());
    let instance = engine.admit(tg_core::AdmissionRequest {
        name: Some("smoke-test".to_string()),
        user: Some("demo".to_string()),
        task_type: task_type.id,
        task_queue: "default".to_string(),
        arguments: None,
    })?;
    info!(uuid = %instance.uuid, "seeded demo instance");

    Ok(())
}
