//! Evidence trails and auditable decisions.
//!
//! An `AuditableDecision` bundles an outcome with the certainty that
//! produced it, the reasoning, an ordered evidence trail, and metadata.
//! The canonical constructors couple certainty to result polarity:
//! `approve` → Mark + success, `reject` → Void + failure, `uncertain` →
//! Imaginary + failure. Every gating decision must be reconstructable after
//! the fact from its audit entry alone.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::form::Form;

// ── Evidence ────────────────────────────────────────────────────────────

/// A single evaluated criterion within a decision's evidence trail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Name of the criterion that produced this evaluation.
    pub criterion_name: String,
    /// The criterion's verdict.
    pub evaluation: Form,
    /// Free-text detail behind the verdict.
    pub description: String,
    /// When the evaluation happened.
    pub timestamp: DateTime<Utc>,
}

impl Evidence {
    /// Create a new evidence entry stamped now.
    pub fn new(
        criterion_name: impl Into<String>,
        evaluation: Form,
        description: impl Into<String>,
    ) -> Self {
        Self {
            criterion_name: criterion_name.into(),
            evaluation,
            description: description.into(),
            timestamp: Utc::now(),
        }
    }
}

// ── AuditableDecision ───────────────────────────────────────────────────

/// A decision outcome bundled with the evidence that produced it.
///
/// The builder methods (`with_evidence`, `with_metadata`) consume the
/// decision and return an extended one; the trail is append-only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditableDecision<T> {
    /// The outcome: a value on success, a short reason on failure.
    pub result: Result<T, String>,
    /// How certain the decision is.
    pub certainty: Form,
    /// Why the decision came out this way.
    pub reasoning: String,
    /// Ordered trail of evaluated criteria.
    pub evidence_trail: Vec<Evidence>,
    /// Supplementary key/value context, rendered in key order.
    pub metadata: BTreeMap<String, String>,
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
}

impl<T> AuditableDecision<T> {
    /// General constructor for outcomes where certainty and result
    /// polarity diverge (a passed gate whose tool still failed).
    pub fn new(result: Result<T, String>, certainty: Form, reasoning: impl Into<String>) -> Self {
        Self {
            result,
            certainty,
            reasoning: reasoning.into(),
            evidence_trail: Vec::new(),
            metadata: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Approved: Mark certainty carrying a success value.
    pub fn approve(value: T, reasoning: impl Into<String>) -> Self {
        Self::new(Ok(value), Form::Mark, reasoning)
    }

    /// Rejected: Void certainty carrying a failure reason.
    pub fn reject(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(Err(reason.clone()), Form::Void, reason)
    }

    /// Uncertain: Imaginary certainty carrying a failure reason.
    ///
    /// Uncertainty is a failure outcome — "don't know" never grants.
    pub fn uncertain(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(Err(reason.clone()), Form::Imaginary, reason)
    }

    /// Append one evidence entry.
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence_trail.push(evidence);
        self
    }

    /// Append a whole trail, preserving order.
    pub fn with_evidence_trail(mut self, trail: impl IntoIterator<Item = Evidence>) -> Self {
        self.evidence_trail.extend(trail);
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether the gate affirmed (certainty is Mark).
    pub fn is_approved(&self) -> bool {
        self.certainty.is_mark()
    }

    /// Whether the decision is an escalatable uncertainty.
    pub fn is_uncertain(&self) -> bool {
        self.certainty.is_imaginary()
    }

    /// Re-type a decision that carries no success value.
    ///
    /// Returns `None` when the result is a success, since the value cannot
    /// be carried across types.
    pub fn into_failure<U>(self) -> Option<AuditableDecision<U>> {
        match self.result {
            Ok(_) => None,
            Err(reason) => Some(AuditableDecision {
                result: Err(reason),
                certainty: self.certainty,
                reasoning: self.reasoning,
                evidence_trail: self.evidence_trail,
                metadata: self.metadata,
                timestamp: self.timestamp,
            }),
        }
    }

    /// Render a deterministic multi-line audit record.
    ///
    /// Layout: decision symbol and result kind, reasoning, one line per
    /// evidence entry, then metadata lines in key order.
    pub fn to_audit_entry(&self) -> String {
        let mut lines = Vec::new();
        let kind = match &self.result {
            Ok(_) => "success".to_string(),
            Err(reason) => format!("failure: {}", reason),
        };
        lines.push(format!("[{}] {}", self.certainty.symbol(), kind));
        lines.push(format!("reasoning: {}", self.reasoning));
        for evidence in &self.evidence_trail {
            lines.push(format!(
                "  {}: {} ({})",
                evidence.criterion_name,
                evidence.evaluation.symbol(),
                evidence.description,
            ));
        }
        for (key, value) in &self.metadata {
            lines.push(format!("  {} = {}", key, value));
        }
        lines.join("\n")
    }
}
