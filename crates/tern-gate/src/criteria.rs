//! Built-in safety criteria.
//!
//! Reusable guards that cover the common gating concerns: caller
//! confidence, known-dangerous tool names, and runaway argument payloads.
//! Domain-specific criteria implement [`SafetyCriterion`] alongside these.

use tern_types::{Form, ToolCall};

use crate::context::GateContext;
use crate::executor::{CriterionOutcome, SafetyCriterion};

/// Maps the caller's confidence through the two-threshold conversion:
/// high confidence affirms, low denies, the band between is uncertain.
pub struct ConfidenceFloor {
    high: f64,
    low: f64,
}

impl ConfidenceFloor {
    /// Create with explicit thresholds.
    pub fn new(high: f64, low: f64) -> Self {
        Self { high, low }
    }
}

impl Default for ConfidenceFloor {
    fn default() -> Self {
        Self::new(0.8, 0.3)
    }
}

impl SafetyCriterion for ConfidenceFloor {
    fn name(&self) -> &str {
        "confidence-floor"
    }

    fn evaluate(&self, call: &ToolCall, _ctx: &GateContext) -> anyhow::Result<CriterionOutcome> {
        let verdict = Form::from_confidence(call.confidence, self.high, self.low);
        Ok(CriterionOutcome {
            verdict,
            details: format!(
                "confidence {:.2} against thresholds (high {:.2}, low {:.2})",
                call.confidence, self.high, self.low,
            ),
        })
    }
}

/// Denies any tool whose name contains a configured pattern.
pub struct ForbiddenToolPattern {
    patterns: Vec<String>,
}

impl ForbiddenToolPattern {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

impl SafetyCriterion for ForbiddenToolPattern {
    fn name(&self) -> &str {
        "forbidden-tool-pattern"
    }

    fn evaluate(&self, call: &ToolCall, _ctx: &GateContext) -> anyhow::Result<CriterionOutcome> {
        let lower = call.name.to_lowercase();
        for pattern in &self.patterns {
            if lower.contains(pattern.as_str()) {
                return Ok(CriterionOutcome::deny(format!(
                    "tool name '{}' matches forbidden pattern '{}'",
                    call.name, pattern,
                )));
            }
        }
        Ok(CriterionOutcome::pass("no forbidden pattern matched"))
    }
}

/// Denies calls whose serialized arguments exceed a byte budget.
pub struct ArgumentSizeBound {
    max_bytes: usize,
}

impl ArgumentSizeBound {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl SafetyCriterion for ArgumentSizeBound {
    fn name(&self) -> &str {
        "argument-size-bound"
    }

    fn evaluate(&self, call: &ToolCall, _ctx: &GateContext) -> anyhow::Result<CriterionOutcome> {
        let size = serde_json::to_vec(&call.arguments)?.len();
        if size > self.max_bytes {
            Ok(CriterionOutcome::deny(format!(
                "arguments are {} bytes (max {})",
                size, self.max_bytes,
            )))
        } else {
            Ok(CriterionOutcome::pass(format!(
                "arguments are {} bytes (max {})",
                size, self.max_bytes,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn confidence_floor_buckets() {
        let criterion = ConfidenceFloor::default();
        let ctx = GateContext::new();

        let call = ToolCall::new("t", json!({})).with_confidence(0.9);
        assert_eq!(criterion.evaluate(&call, &ctx).unwrap().verdict, Form::Mark);

        let call = ToolCall::new("t", json!({})).with_confidence(0.5);
        assert_eq!(
            criterion.evaluate(&call, &ctx).unwrap().verdict,
            Form::Imaginary,
        );

        let call = ToolCall::new("t", json!({})).with_confidence(0.1);
        assert_eq!(criterion.evaluate(&call, &ctx).unwrap().verdict, Form::Void);
    }

    #[test]
    fn forbidden_pattern_denies_matching_tool() {
        let criterion = ForbiddenToolPattern::new(["shell", "rm_"]);
        let ctx = GateContext::new();

        let call = ToolCall::new("run_shell_command", json!({}));
        let outcome = criterion.evaluate(&call, &ctx).unwrap();
        assert_eq!(outcome.verdict, Form::Void);
        assert!(outcome.details.contains("shell"));

        let call = ToolCall::new("calculator", json!({}));
        assert_eq!(criterion.evaluate(&call, &ctx).unwrap().verdict, Form::Mark);
    }

    #[test]
    fn argument_size_bound() {
        let criterion = ArgumentSizeBound::new(32);
        let ctx = GateContext::new();

        let call = ToolCall::new("t", json!({"k": "small"}));
        assert_eq!(criterion.evaluate(&call, &ctx).unwrap().verdict, Form::Mark);

        let call = ToolCall::new("t", json!({"k": "x".repeat(100)}));
        assert_eq!(criterion.evaluate(&call, &ctx).unwrap().verdict, Form::Void);
    }
}
