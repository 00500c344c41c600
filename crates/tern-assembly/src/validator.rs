//! Symbolic validation seam.

use anyhow::bail;
use async_trait::async_trait;

use crate::blueprint::{NeuronBlueprint, SymbolicValidation};

/// Judges a blueprint before any code exists for it.
///
/// Production implementations query a symbolic reasoner; the engine
/// treats the verdict as authoritative for admission and records the
/// expression it came from.
#[async_trait]
pub trait SymbolicValidator: Send + Sync {
    async fn validate(&self, blueprint: &NeuronBlueprint) -> anyhow::Result<SymbolicValidation>;

    fn name(&self) -> &str;
}

// ── Test double ─────────────────────────────────────────────────────────

enum ValidatorBehavior {
    Score(f64),
    Invalid(Vec<String>),
    Fault(String),
}

/// Validator double: fixed score, fixed violations, or an outright
/// fault.
pub struct SimulatedValidator {
    behavior: ValidatorBehavior,
}

impl SimulatedValidator {
    /// Valid verdict with a comfortable score.
    pub fn passing() -> Self {
        Self::with_score(0.95)
    }

    /// Valid verdict with the given score.
    pub fn with_score(score: f64) -> Self {
        Self {
            behavior: ValidatorBehavior::Score(score),
        }
    }

    /// Invalid verdict listing `violations`.
    pub fn rejecting(violations: Vec<String>) -> Self {
        Self {
            behavior: ValidatorBehavior::Invalid(violations),
        }
    }

    /// The validator itself errors.
    pub fn faulting(message: impl Into<String>) -> Self {
        Self {
            behavior: ValidatorBehavior::Fault(message.into()),
        }
    }
}

#[async_trait]
impl SymbolicValidator for SimulatedValidator {
    async fn validate(&self, blueprint: &NeuronBlueprint) -> anyhow::Result<SymbolicValidation> {
        match &self.behavior {
            ValidatorBehavior::Score(score) => Ok(SymbolicValidation::passing(
                *score,
                format!("(validate-unit {} {:.2})", blueprint.name, score),
            )),
            ValidatorBehavior::Invalid(violations) => Ok(SymbolicValidation::failing(
                violations.clone(),
                format!("(validate-unit {} 0.00)", blueprint.name),
            )),
            ValidatorBehavior::Fault(message) => bail!("{}", message),
        }
    }

    fn name(&self) -> &str {
        "simulated-validator"
    }
}
