//! End-to-end lifecycle: a mixed batch of blueprints through submission,
//! approval, and deployment, observed from the public surface only.

use std::sync::Arc;
use std::time::Duration;

use tern_assembly::{
    AssemblyConfig, AssemblyError, AssemblyEvent, NeuralMessage, NeuronBlueprint, ProposalId,
    ProposalStatus, SelfAssemblyEngine, SimulatedGenerator, SimulatedSandbox, SimulatedValidator,
};

fn make_engine(config: AssemblyConfig) -> SelfAssemblyEngine {
    SelfAssemblyEngine::with_config(
        config,
        Arc::new(SimulatedValidator::passing()),
        Arc::new(SimulatedGenerator::new()),
        Arc::new(SimulatedSandbox::new()),
    )
}

async fn wait_for_terminal(engine: &SelfAssemblyEngine, id: &ProposalId) -> ProposalStatus {
    for _ in 0..200 {
        if let Some(proposal) = engine.get_proposal(id) {
            if proposal.status.is_terminal() {
                return proposal.status;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("proposal never reached a terminal status");
}

#[tokio::test]
async fn mixed_batch_deploys_only_the_safe_units() {
    let engine = make_engine(AssemblyConfig::default());
    let mut events = engine.subscribe();

    // One sound blueprint, one asking for a forbidden capability.
    let watcher = NeuronBlueprint::new("anomaly-watcher", "sensor")
        .with_description("Watches telemetry for anomalies")
        .with_rationale("Repeated unexplained spikes in queue depth")
        .with_topic("telemetry.*")
        .with_handler("on_sample")
        .with_confidence(0.85);
    let spawner = NeuronBlueprint::new("shell-runner", "actuator")
        .with_capability("process_execution")
        .with_confidence(0.85);

    let watcher_id = engine.submit_blueprint(watcher).await.unwrap();
    let err = engine.submit_blueprint(spawner).await.unwrap_err();
    assert!(matches!(err, AssemblyError::ForbiddenCapability { .. }));

    engine.approve_proposal(&watcher_id).unwrap();
    assert_eq!(
        wait_for_terminal(&engine, &watcher_id).await,
        ProposalStatus::Deployed,
    );
    assert_eq!(engine.assembled_unit_names(), vec!["anomaly-watcher"]);

    // The deployed unit is live and handles bus traffic.
    let unit = engine.assembled_unit("anomaly-watcher").unwrap();
    let message = NeuralMessage::new("telemetry.cpu", serde_json::json!({"load": 0.9}))
        .with_source("telemetry-collector");
    unit.handle(&message).unwrap();

    match events.recv().await.unwrap() {
        AssemblyEvent::UnitAssembled { name, .. } => assert_eq!(name, "anomaly-watcher"),
        other => panic!("expected UnitAssembled, got {:?}", other),
    }
}

#[tokio::test]
async fn rejection_leaves_no_trace_in_the_registry() {
    let engine = make_engine(AssemblyConfig::default());

    let id = engine
        .submit_blueprint(
            NeuronBlueprint::new("doubtful", "processor")
                .with_handler("on_message")
                .with_confidence(0.6),
        )
        .await
        .unwrap();
    engine.reject_proposal(&id, "operator declined").unwrap();

    let history = engine.state_history(&id);
    assert_eq!(history.last().unwrap().status, ProposalStatus::Rejected);
    assert_eq!(
        history.last().unwrap().details.as_deref(),
        Some("operator declined"),
    );
    assert!(engine.assembled_unit_names().is_empty());
    assert!(engine.pending_proposals().is_empty());
}

#[tokio::test]
async fn auto_approval_and_quota_interact() {
    let engine = make_engine(AssemblyConfig {
        auto_approve: true,
        max_deployed_units: 2,
        ..AssemblyConfig::default()
    });

    for name in ["first", "second"] {
        let id = engine
            .submit_blueprint(
                NeuronBlueprint::new(name, "sensor")
                    .with_handler("on_sample")
                    .with_confidence(0.95),
            )
            .await
            .unwrap();
        assert_eq!(wait_for_terminal(&engine, &id).await, ProposalStatus::Deployed);
    }

    let err = engine
        .submit_blueprint(
            NeuronBlueprint::new("third", "sensor")
                .with_handler("on_sample")
                .with_confidence(0.95),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AssemblyError::QuotaReached { limit: 2 }));
    assert_eq!(engine.assembled_unit_names(), vec!["first", "second"]);
}
