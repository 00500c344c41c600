//! Assembly proposals and their lifecycle state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blueprint::NeuronBlueprint;

/// Opaque proposal identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalId(Uuid);

impl ProposalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProposalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a proposal stands in the assembly pipeline.
///
/// Forward-only: `PendingApproval → SecurityValidating → SandboxTesting
/// → Deployed`, with `Rejected` and `Failed` as terminal exits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Waiting for human (or auto-) approval.
    PendingApproval,
    /// Approved; generated code is being scanned.
    SecurityValidating,
    /// Scan clean; the unit is being constructed in the sandbox.
    SandboxTesting,
    /// Constructed and registered.
    Deployed,
    /// Declined while pending.
    Rejected,
    /// A pipeline stage failed after approval.
    Failed,
}

impl ProposalStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Deployed | Self::Rejected | Self::Failed)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PendingApproval => "pending approval",
            Self::SecurityValidating => "security validating",
            Self::SandboxTesting => "sandbox testing",
            Self::Deployed => "deployed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One recorded state change.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateTransition {
    pub status: ProposalStatus,
    pub timestamp: DateTime<Utc>,
    /// Operator-facing note: approval source, scan findings, failure
    /// reason.
    pub details: Option<String>,
}

/// A blueprint plus its generated code, moving through the pipeline.
///
/// Every state change is appended to `state_history`, so a deployed or
/// failed proposal carries its full audit trail.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssemblyProposal {
    pub id: ProposalId,
    pub blueprint: NeuronBlueprint,
    pub generated_code: String,
    pub status: ProposalStatus,
    pub state_history: Vec<StateTransition>,
    pub created_at: DateTime<Utc>,
}

impl AssemblyProposal {
    pub fn new(blueprint: NeuronBlueprint, generated_code: String) -> Self {
        let now = Utc::now();
        Self {
            id: ProposalId::new(),
            blueprint,
            generated_code,
            status: ProposalStatus::PendingApproval,
            state_history: vec![StateTransition {
                status: ProposalStatus::PendingApproval,
                timestamp: now,
                details: Some("proposal created".into()),
            }],
            created_at: now,
        }
    }

    /// Move to `status`, recording the transition.
    pub fn transition_to(&mut self, status: ProposalStatus, details: Option<String>) {
        self.status = status;
        self.state_history.push(StateTransition {
            status,
            timestamp: Utc::now(),
            details,
        });
    }
}
