//! Walks three blueprints through the self-assembly engine: one deploys,
//! one asks for a forbidden capability, one generates code the security
//! scan catches.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use tern_assembly::{
    AssemblyConfig, AssemblyEvent, NeuralMessage, NeuronBlueprint, ProposalId, SelfAssemblyEngine,
    SimulatedGenerator, SimulatedSandbox, SimulatedValidator,
};

async fn wait_for_terminal(engine: &SelfAssemblyEngine, id: &ProposalId) {
    for _ in 0..200 {
        if let Some(proposal) = engine.get_proposal(id) {
            if proposal.status.is_terminal() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn print_history(engine: &SelfAssemblyEngine, id: &ProposalId) {
    println!("  state history:");
    for transition in engine.state_history(id) {
        match &transition.details {
            Some(details) => println!("    {} — {}", transition.status, details),
            None => println!("    {}", transition.status),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let engine = SelfAssemblyEngine::with_config(
        AssemblyConfig::default(),
        Arc::new(SimulatedValidator::passing()),
        Arc::new(SimulatedGenerator::new()),
        Arc::new(SimulatedSandbox::new()),
    );
    let mut events = engine.subscribe();

    // 1. A sound blueprint: submitted, approved, deployed.
    let watcher = NeuronBlueprint::new("anomaly-watcher", "sensor")
        .with_description("Watches telemetry for anomalies")
        .with_rationale("Repeated unexplained spikes in queue depth")
        .with_topic("telemetry.*")
        .with_handler("on_sample")
        .with_autonomous_tick("Recompute baselines every minute")
        .with_confidence(0.85)
        .with_identified_by("coherence-monitor");

    println!("── submitting 'anomaly-watcher'");
    let id = engine.submit_blueprint(watcher).await?;
    println!("  proposal {} pending approval", id);
    engine.approve_proposal(&id)?;
    wait_for_terminal(&engine, &id).await;
    print_history(&engine, &id);

    // 2. A blueprint asking for a forbidden capability never becomes a
    //    proposal.
    let spawner = NeuronBlueprint::new("shell-runner", "actuator")
        .with_description("Runs maintenance shell commands")
        .with_capability("process_execution")
        .with_confidence(0.9);
    println!("── submitting 'shell-runner'");
    match engine.submit_blueprint(spawner).await {
        Ok(id) => println!("  unexpectedly accepted as {}", id),
        Err(err) => println!("  rejected: {}", err),
    }

    // 3. Clean blueprint, dirty code: the scan fails it after approval.
    let exfiltrator_engine = SelfAssemblyEngine::with_config(
        AssemblyConfig::default(),
        Arc::new(SimulatedValidator::passing()),
        Arc::new(SimulatedGenerator::with_source(
            "use std::net::TcpStream;\nfn on_sample() {}\n",
        )),
        Arc::new(SimulatedSandbox::new()),
    );
    println!("── submitting 'metrics-uploader' (generated code reaches for the network)");
    let id = exfiltrator_engine
        .submit_blueprint(
            NeuronBlueprint::new("metrics-uploader", "actuator")
                .with_handler("on_sample")
                .with_confidence(0.8),
        )
        .await?;
    exfiltrator_engine.approve_proposal(&id)?;
    wait_for_terminal(&exfiltrator_engine, &id).await;
    print_history(&exfiltrator_engine, &id);

    // The deployed unit is live.
    println!("── deployed units: {:?}", engine.assembled_unit_names());
    if let Some(unit) = engine.assembled_unit("anomaly-watcher") {
        let message = NeuralMessage::new("telemetry.cpu", serde_json::json!({"load": 0.9}))
            .with_source("telemetry-collector");
        unit.handle(&message)?;
        info!(unit = unit.name(), topic = %message.topic, "Message delivered");
    }

    while let Ok(event) = events.try_recv() {
        match event {
            AssemblyEvent::UnitAssembled { name, .. } => {
                println!("── event: unit '{}' assembled ✓", name);
            }
            AssemblyEvent::AssemblyFailed { name, reason } => {
                println!("── event: unit '{}' failed ✗ ({})", name, reason);
            }
        }
    }

    Ok(())
}
