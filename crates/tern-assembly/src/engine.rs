//! The self-assembly engine.
//!
//! Drives a blueprint through the full lifecycle: admission checks,
//! symbolic validation, code generation, approval, static security
//! scan, sandboxed construction, and registration. Submission and
//! approval are synchronous decisions; everything after approval runs
//! in a spawned task and reports through the proposal's state history
//! and the event bus.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::blueprint::NeuronBlueprint;
use crate::config::AssemblyConfig;
use crate::error::{AssemblyError, AssemblyResult};
use crate::events::{AssemblyEvent, EventBus};
use crate::generator::UnitCodeGenerator;
use crate::proposal::{AssemblyProposal, ProposalId, ProposalStatus, StateTransition};
use crate::sandbox::UnitSandbox;
use crate::scan::SecurityScanner;
use crate::unit::AssembledUnit;
use crate::validator::SymbolicValidator;

/// Orchestrates the blueprint-to-deployed-unit lifecycle.
///
/// Cheap to clone; clones share proposals, units, and the event bus.
#[derive(Clone)]
pub struct SelfAssemblyEngine {
    config: AssemblyConfig,
    validator: Arc<dyn SymbolicValidator>,
    generator: Arc<dyn UnitCodeGenerator>,
    sandbox: Arc<dyn UnitSandbox>,
    proposals: Arc<RwLock<HashMap<ProposalId, AssemblyProposal>>>,
    units: Arc<RwLock<HashMap<String, Arc<dyn AssembledUnit>>>>,
    events: Arc<EventBus>,
}

impl SelfAssemblyEngine {
    pub fn new(
        validator: Arc<dyn SymbolicValidator>,
        generator: Arc<dyn UnitCodeGenerator>,
        sandbox: Arc<dyn UnitSandbox>,
    ) -> Self {
        Self::with_config(AssemblyConfig::default(), validator, generator, sandbox)
    }

    pub fn with_config(
        config: AssemblyConfig,
        validator: Arc<dyn SymbolicValidator>,
        generator: Arc<dyn UnitCodeGenerator>,
        sandbox: Arc<dyn UnitSandbox>,
    ) -> Self {
        Self {
            config,
            validator,
            generator,
            sandbox,
            proposals: Arc::new(RwLock::new(HashMap::new())),
            units: Arc::new(RwLock::new(HashMap::new())),
            events: Arc::new(EventBus::new()),
        }
    }

    /// Receive assembly lifecycle events. Subscribe before approving to
    /// see a proposal's outcome.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<AssemblyEvent> {
        self.events.subscribe()
    }

    // ── Submission ──────────────────────────────────────────────────────

    /// Admit a blueprint: capability and quota checks, symbolic
    /// validation, code generation, then a pending proposal.
    ///
    /// With auto-approval enabled and the blueprint's confidence over
    /// the threshold, the pipeline starts immediately; the returned id
    /// is still valid for status queries either way.
    pub async fn submit_blueprint(
        &self,
        blueprint: NeuronBlueprint,
    ) -> AssemblyResult<ProposalId> {
        if let Some(capability) = blueprint
            .capabilities
            .iter()
            .find(|capability| self.config.forbidden_capabilities.contains(*capability))
        {
            warn!(
                unit = %blueprint.name,
                capability = %capability,
                "Blueprint requests forbidden capability",
            );
            return Err(AssemblyError::ForbiddenCapability {
                name: blueprint.name.clone(),
                capability: capability.clone(),
            });
        }

        let deployed = self
            .units
            .read()
            .expect("unit registry lock poisoned")
            .len();
        if deployed >= self.config.max_deployed_units {
            return Err(AssemblyError::QuotaReached {
                limit: self.config.max_deployed_units,
            });
        }

        let validation = self
            .validator
            .validate(&blueprint)
            .await
            .map_err(|err| AssemblyError::ValidatorFault(err.to_string()))?;
        if validation.safety_score < self.config.min_safety_score {
            return Err(AssemblyError::SafetyScoreBelowMinimum {
                score: validation.safety_score,
                minimum: self.config.min_safety_score,
            });
        }
        if !validation.is_valid {
            return Err(AssemblyError::BlueprintInvalid(
                validation.violations.join("; "),
            ));
        }

        let source = self
            .generator
            .generate(&blueprint)
            .map_err(|err| AssemblyError::CodeGenerationFailed(err.to_string()))?;
        if source.trim().is_empty() {
            return Err(AssemblyError::CodeGenerationFailed(
                "generator returned empty source".into(),
            ));
        }

        let auto_approve = self.config.auto_approve
            && blueprint.confidence_score >= self.config.auto_approve_threshold;
        let proposal = AssemblyProposal::new(blueprint, source);
        let id = proposal.id;
        info!(
            proposal = %id,
            unit = %proposal.blueprint.name,
            safety_score = validation.safety_score,
            auto_approve,
            "Blueprint accepted",
        );
        self.proposals
            .write()
            .expect("proposal registry lock poisoned")
            .insert(id, proposal);

        if auto_approve {
            // Freshly inserted and pending, so this cannot fail.
            self.start_pipeline(&id, Some("auto-approved on confidence".into()))?;
        }
        Ok(id)
    }

    // ── Approval ────────────────────────────────────────────────────────

    /// Approve a pending proposal and start its pipeline. Returns once
    /// the approval is accepted; the pipeline runs in a spawned task.
    pub fn approve_proposal(&self, id: &ProposalId) -> AssemblyResult<()> {
        self.start_pipeline(id, Some("approved".into()))
    }

    /// Reject a pending proposal. Only valid while it is pending.
    pub fn reject_proposal(&self, id: &ProposalId, reason: impl Into<String>) -> AssemblyResult<()> {
        let mut proposals = self
            .proposals
            .write()
            .expect("proposal registry lock poisoned");
        let proposal = proposals
            .get_mut(id)
            .ok_or(AssemblyError::ProposalNotFound(*id))?;
        if proposal.status != ProposalStatus::PendingApproval {
            return Err(AssemblyError::InvalidState {
                id: *id,
                status: proposal.status,
            });
        }
        let reason = reason.into();
        info!(proposal = %id, reason = %reason, "Proposal rejected");
        proposal.transition_to(ProposalStatus::Rejected, Some(reason));
        Ok(())
    }

    fn start_pipeline(&self, id: &ProposalId, details: Option<String>) -> AssemblyResult<()> {
        {
            let mut proposals = self
                .proposals
                .write()
                .expect("proposal registry lock poisoned");
            let proposal = proposals
                .get_mut(id)
                .ok_or(AssemblyError::ProposalNotFound(*id))?;
            if proposal.status != ProposalStatus::PendingApproval {
                return Err(AssemblyError::InvalidState {
                    id: *id,
                    status: proposal.status,
                });
            }
            proposal.transition_to(ProposalStatus::SecurityValidating, details);
        }

        let engine = self.clone();
        let id = *id;
        tokio::spawn(async move { engine.run_pipeline(id).await });
        Ok(())
    }

    // ── Pipeline ────────────────────────────────────────────────────────

    async fn run_pipeline(&self, id: ProposalId) {
        let (blueprint, source) = {
            let proposals = self
                .proposals
                .read()
                .expect("proposal registry lock poisoned");
            match proposals.get(&id) {
                Some(proposal) => (proposal.blueprint.clone(), proposal.generated_code.clone()),
                None => return,
            }
        };
        let unit_name = blueprint.name.clone();

        let scanner = SecurityScanner::new(self.config.forbidden_namespaces.clone());
        if let Some(violation) = scanner.first_violation(&source) {
            self.fail_proposal(
                id,
                &unit_name,
                format!(
                    "generated code references forbidden namespace '{}' (line {}): {}",
                    violation.namespace, violation.line, violation.snippet,
                ),
            );
            return;
        }
        self.transition(id, ProposalStatus::SandboxTesting, Some("security scan clean".into()));

        let deadline = self.config.sandbox_timeout();
        let unit = match tokio::time::timeout(deadline, self.sandbox.construct(&blueprint, &source))
            .await
        {
            Ok(Ok(unit)) => unit,
            Ok(Err(fault)) => {
                self.fail_proposal(id, &unit_name, format!("sandbox construction failed: {fault}"));
                return;
            }
            Err(_) => {
                self.fail_proposal(
                    id,
                    &unit_name,
                    format!("sandbox construction exceeded {:?}", deadline),
                );
                return;
            }
        };

        {
            let mut units = self.units.write().expect("unit registry lock poisoned");
            if units.contains_key(&unit_name) {
                drop(units);
                self.fail_proposal(
                    id,
                    &unit_name,
                    format!("unit '{}' is already registered", unit_name),
                );
                return;
            }
            units.insert(unit_name.clone(), unit.clone());
        }
        self.transition(id, ProposalStatus::Deployed, Some("unit registered".into()));
        info!(proposal = %id, unit = %unit_name, "Unit deployed");
        self.events.emit(AssemblyEvent::UnitAssembled {
            name: unit_name,
            unit,
        });
    }

    fn fail_proposal(&self, id: ProposalId, unit_name: &str, reason: String) {
        warn!(proposal = %id, unit = %unit_name, reason = %reason, "Assembly failed");
        self.transition(id, ProposalStatus::Failed, Some(reason.clone()));
        self.events.emit(AssemblyEvent::AssemblyFailed {
            name: unit_name.to_string(),
            reason,
        });
    }

    fn transition(&self, id: ProposalId, status: ProposalStatus, details: Option<String>) {
        let mut proposals = self
            .proposals
            .write()
            .expect("proposal registry lock poisoned");
        if let Some(proposal) = proposals.get_mut(&id) {
            proposal.transition_to(status, details);
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn get_proposal(&self, id: &ProposalId) -> Option<AssemblyProposal> {
        self.proposals
            .read()
            .expect("proposal registry lock poisoned")
            .get(id)
            .cloned()
    }

    /// Full state history; empty for an unknown id.
    pub fn state_history(&self, id: &ProposalId) -> Vec<StateTransition> {
        self.proposals
            .read()
            .expect("proposal registry lock poisoned")
            .get(id)
            .map(|proposal| proposal.state_history.clone())
            .unwrap_or_default()
    }

    pub fn pending_proposals(&self) -> Vec<AssemblyProposal> {
        self.proposals
            .read()
            .expect("proposal registry lock poisoned")
            .values()
            .filter(|proposal| proposal.status == ProposalStatus::PendingApproval)
            .cloned()
            .collect()
    }

    /// Names of deployed units, sorted.
    pub fn assembled_unit_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .units
            .read()
            .expect("unit registry lock poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn assembled_unit(&self, name: &str) -> Option<Arc<dyn AssembledUnit>> {
        self.units
            .read()
            .expect("unit registry lock poisoned")
            .get(name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::generator::SimulatedGenerator;
    use crate::sandbox::SimulatedSandbox;
    use crate::validator::SimulatedValidator;

    fn make_engine() -> SelfAssemblyEngine {
        SelfAssemblyEngine::new(
            Arc::new(SimulatedValidator::passing()),
            Arc::new(SimulatedGenerator::new()),
            Arc::new(SimulatedSandbox::new()),
        )
    }

    fn make_blueprint(name: &str) -> NeuronBlueprint {
        NeuronBlueprint::new(name, "sensor")
            .with_description("Watches telemetry")
            .with_topic("telemetry.*")
            .with_handler("on_sample")
            .with_confidence(0.8)
    }

    /// Poll until the proposal reaches a terminal status.
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
    async fn full_lifecycle_deploys_unit() {
        let engine = make_engine();
        let mut events = engine.subscribe();

        let id = engine
            .submit_blueprint(make_blueprint("watcher"))
            .await
            .unwrap();
        assert_eq!(engine.pending_proposals().len(), 1);

        engine.approve_proposal(&id).unwrap();
        assert_eq!(wait_for_terminal(&engine, &id).await, ProposalStatus::Deployed);

        assert_eq!(engine.assembled_unit_names(), vec!["watcher"]);
        assert!(engine.assembled_unit("watcher").is_some());

        let statuses: Vec<_> = engine
            .state_history(&id)
            .iter()
            .map(|transition| transition.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                ProposalStatus::PendingApproval,
                ProposalStatus::SecurityValidating,
                ProposalStatus::SandboxTesting,
                ProposalStatus::Deployed,
            ],
        );

        match events.recv().await.unwrap() {
            AssemblyEvent::UnitAssembled { name, unit } => {
                assert_eq!(name, "watcher");
                assert_eq!(unit.name(), "watcher");
            }
            other => panic!("expected UnitAssembled, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn forbidden_capability_is_rejected_at_submission() {
        let engine = make_engine();
        let blueprint = make_blueprint("spawner").with_capability("process_execution");
        let err = engine.submit_blueprint(blueprint).await.unwrap_err();
        match err {
            AssemblyError::ForbiddenCapability { name, capability } => {
                assert_eq!(name, "spawner");
                assert_eq!(capability, "process_execution");
            }
            other => panic!("expected ForbiddenCapability, got {other}"),
        }
        assert!(engine.pending_proposals().is_empty());
    }

    #[tokio::test]
    async fn low_safety_score_is_rejected() {
        let engine = SelfAssemblyEngine::new(
            Arc::new(SimulatedValidator::with_score(0.4)),
            Arc::new(SimulatedGenerator::new()),
            Arc::new(SimulatedSandbox::new()),
        );
        let err = engine
            .submit_blueprint(make_blueprint("watcher"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Safety score"));
        assert!(err.to_string().contains("below minimum"));
    }

    #[tokio::test]
    async fn invalid_blueprint_lists_violations() {
        // Rejecting validator scores 0.0, so drop the floor to reach the
        // validity check.
        let engine = SelfAssemblyEngine::with_config(
            AssemblyConfig {
                min_safety_score: 0.0,
                ..AssemblyConfig::default()
            },
            Arc::new(SimulatedValidator::rejecting(vec![
                "handler set is empty".into(),
                "tick has no bound".into(),
            ])),
            Arc::new(SimulatedGenerator::new()),
            Arc::new(SimulatedSandbox::new()),
        );
        let err = engine
            .submit_blueprint(make_blueprint("watcher"))
            .await
            .unwrap_err();
        match err {
            AssemblyError::BlueprintInvalid(violations) => {
                assert!(violations.contains("handler set is empty"));
                assert!(violations.contains("tick has no bound"));
            }
            other => panic!("expected BlueprintInvalid, got {other}"),
        }
    }

    #[tokio::test]
    async fn generator_failure_surfaces_at_submission() {
        let engine = SelfAssemblyEngine::new(
            Arc::new(SimulatedValidator::passing()),
            Arc::new(SimulatedGenerator::failing("model unavailable")),
            Arc::new(SimulatedSandbox::new()),
        );
        let err = engine
            .submit_blueprint(make_blueprint("watcher"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssemblyError::CodeGenerationFailed(_)));
    }

    #[tokio::test]
    async fn validator_fault_surfaces_at_submission() {
        let engine = SelfAssemblyEngine::new(
            Arc::new(SimulatedValidator::faulting("reasoner offline")),
            Arc::new(SimulatedGenerator::new()),
            Arc::new(SimulatedSandbox::new()),
        );
        let err = engine
            .submit_blueprint(make_blueprint("watcher"))
            .await
            .unwrap_err();
        match err {
            AssemblyError::ValidatorFault(message) => {
                assert!(message.contains("reasoner offline"));
            }
            other => panic!("expected ValidatorFault, got {other}"),
        }
    }

    #[tokio::test]
    async fn quota_blocks_submission() {
        let engine = SelfAssemblyEngine::with_config(
            AssemblyConfig {
                max_deployed_units: 1,
                ..AssemblyConfig::default()
            },
            Arc::new(SimulatedValidator::passing()),
            Arc::new(SimulatedGenerator::new()),
            Arc::new(SimulatedSandbox::new()),
        );
        let id = engine
            .submit_blueprint(make_blueprint("first"))
            .await
            .unwrap();
        engine.approve_proposal(&id).unwrap();
        wait_for_terminal(&engine, &id).await;

        let err = engine
            .submit_blueprint(make_blueprint("second"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssemblyError::QuotaReached { limit: 1 }));
    }

    #[tokio::test]
    async fn security_scan_fails_proposal_and_emits_event() {
        let engine = SelfAssemblyEngine::new(
            Arc::new(SimulatedValidator::passing()),
            Arc::new(SimulatedGenerator::with_source(
                "use std::net::TcpStream;\nfn on_sample() {}\n",
            )),
            Arc::new(SimulatedSandbox::new()),
        );
        let mut events = engine.subscribe();

        let id = engine
            .submit_blueprint(make_blueprint("exfiltrator"))
            .await
            .unwrap();
        engine.approve_proposal(&id).unwrap();
        assert_eq!(wait_for_terminal(&engine, &id).await, ProposalStatus::Failed);

        let history = engine.state_history(&id);
        let failure = history.last().unwrap();
        assert!(failure.details.as_deref().unwrap().contains("std::net"));
        assert!(engine.assembled_unit_names().is_empty());

        match events.recv().await.unwrap() {
            AssemblyEvent::AssemblyFailed { name, reason } => {
                assert_eq!(name, "exfiltrator");
                assert!(reason.contains("forbidden namespace"));
            }
            other => panic!("expected AssemblyFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn sandbox_failure_fails_proposal() {
        let engine = SelfAssemblyEngine::new(
            Arc::new(SimulatedValidator::passing()),
            Arc::new(SimulatedGenerator::new()),
            Arc::new(SimulatedSandbox::failing("type error in handler")),
        );
        let id = engine
            .submit_blueprint(make_blueprint("watcher"))
            .await
            .unwrap();
        engine.approve_proposal(&id).unwrap();
        assert_eq!(wait_for_terminal(&engine, &id).await, ProposalStatus::Failed);
        let history = engine.state_history(&id);
        assert!(history
            .last()
            .unwrap()
            .details
            .as_deref()
            .unwrap()
            .contains("type error"));
    }

    #[tokio::test]
    async fn hanging_sandbox_hits_timeout() {
        let engine = SelfAssemblyEngine::with_config(
            AssemblyConfig {
                sandbox_timeout_ms: 50,
                ..AssemblyConfig::default()
            },
            Arc::new(SimulatedValidator::passing()),
            Arc::new(SimulatedGenerator::new()),
            Arc::new(SimulatedSandbox::hanging()),
        );
        let id = engine
            .submit_blueprint(make_blueprint("sleeper"))
            .await
            .unwrap();
        engine.approve_proposal(&id).unwrap();
        assert_eq!(wait_for_terminal(&engine, &id).await, ProposalStatus::Failed);
        let history = engine.state_history(&id);
        assert!(history
            .last()
            .unwrap()
            .details
            .as_deref()
            .unwrap()
            .contains("exceeded"));
    }

    #[tokio::test]
    async fn duplicate_unit_name_fails_second_deployment() {
        let engine = make_engine();
        let first = engine
            .submit_blueprint(make_blueprint("watcher"))
            .await
            .unwrap();
        engine.approve_proposal(&first).unwrap();
        assert_eq!(
            wait_for_terminal(&engine, &first).await,
            ProposalStatus::Deployed,
        );

        let second = engine
            .submit_blueprint(make_blueprint("watcher"))
            .await
            .unwrap();
        engine.approve_proposal(&second).unwrap();
        assert_eq!(
            wait_for_terminal(&engine, &second).await,
            ProposalStatus::Failed,
        );
        assert_eq!(engine.assembled_unit_names(), vec!["watcher"]);
    }

    #[tokio::test]
    async fn reject_then_approve_is_invalid_state() {
        let engine = make_engine();
        let id = engine
            .submit_blueprint(make_blueprint("watcher"))
            .await
            .unwrap();
        engine.reject_proposal(&id, "not needed").unwrap();
        assert_eq!(
            engine.get_proposal(&id).unwrap().status,
            ProposalStatus::Rejected,
        );

        let err = engine.approve_proposal(&id).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::InvalidState {
                status: ProposalStatus::Rejected,
                ..
            },
        ));
    }

    #[tokio::test]
    async fn unknown_proposal_operations() {
        let engine = make_engine();
        let id = ProposalId::new();
        assert!(engine.get_proposal(&id).is_none());
        assert!(engine.state_history(&id).is_empty());
        assert!(matches!(
            engine.approve_proposal(&id).unwrap_err(),
            AssemblyError::ProposalNotFound(_),
        ));
        assert!(matches!(
            engine.reject_proposal(&id, "r").unwrap_err(),
            AssemblyError::ProposalNotFound(_),
        ));
    }

    #[tokio::test]
    async fn auto_approval_skips_pending() {
        let engine = SelfAssemblyEngine::with_config(
            AssemblyConfig {
                auto_approve: true,
                ..AssemblyConfig::default()
            },
            Arc::new(SimulatedValidator::passing()),
            Arc::new(SimulatedGenerator::new()),
            Arc::new(SimulatedSandbox::new()),
        );
        let id = engine
            .submit_blueprint(make_blueprint("watcher").with_confidence(0.95))
            .await
            .unwrap();
        assert_eq!(wait_for_terminal(&engine, &id).await, ProposalStatus::Deployed);

        // Below the threshold, the proposal still waits.
        let waiting = engine
            .submit_blueprint(make_blueprint("slow-watcher").with_confidence(0.5))
            .await
            .unwrap();
        assert_eq!(
            engine.get_proposal(&waiting).unwrap().status,
            ProposalStatus::PendingApproval,
        );
    }
}
