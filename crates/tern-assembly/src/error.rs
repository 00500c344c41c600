//! Error types for the self-assembly engine.

use thiserror::Error;

use crate::proposal::{ProposalId, ProposalStatus};

/// Errors surfaced by blueprint submission and proposal management.
///
/// Pipeline-stage failures (security scan, sandbox construction,
/// registration) do not appear here: they are recorded on the proposal's
/// state history and announced on the event bus instead, because by then
/// the caller has already handed the work off.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The blueprint requested a capability the configuration forbids.
    #[error("blueprint '{name}' declares forbidden capability '{capability}'")]
    ForbiddenCapability { name: String, capability: String },

    /// Deploying one more unit would exceed the configured ceiling.
    #[error("deployed-unit quota reached ({limit})")]
    QuotaReached { limit: usize },

    /// Symbolic validation scored the blueprint under the floor.
    #[error("Safety score {score:.2} below minimum {minimum:.2}")]
    SafetyScoreBelowMinimum { score: f64, minimum: f64 },

    /// Symbolic validation judged the blueprint invalid.
    #[error("blueprint rejected by symbolic validation: {0}")]
    BlueprintInvalid(String),

    /// The validator itself failed to produce a verdict.
    #[error("symbolic validation error: {0}")]
    ValidatorFault(String),

    /// The code generator produced an error or empty output.
    #[error("code generation failed: {0}")]
    CodeGenerationFailed(String),

    /// No proposal is registered under this id.
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    /// The proposal is past the point where this operation applies.
    #[error("proposal {id} is {status}, expected pending approval")]
    InvalidState {
        id: ProposalId,
        status: ProposalStatus,
    },
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;
