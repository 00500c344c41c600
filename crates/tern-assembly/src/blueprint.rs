//! Unit blueprints and symbolic-validation verdicts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Declarative description of a unit the system wants to build for
/// itself: what it is for, what it listens to, and what it is allowed
/// to touch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NeuronBlueprint {
    /// Unique unit name; doubles as the registration key on deployment.
    pub name: String,
    /// What the unit does.
    pub description: String,
    /// Why the system believes it needs this unit.
    pub rationale: String,
    /// Coarse role, e.g. "sensor", "processor", "actuator".
    pub unit_type: String,
    /// Message topics the unit subscribes to.
    pub subscribed_topics: BTreeSet<String>,
    /// Capabilities the unit requests; checked against the forbidden set.
    pub capabilities: BTreeSet<String>,
    /// Named handlers the generated code must implement.
    pub message_handlers: Vec<String>,
    /// Whether the unit runs a periodic tick without external input.
    pub has_autonomous_tick: bool,
    /// What the tick does, when present.
    pub tick_description: Option<String>,
    /// The proposer's own confidence in the blueprint, in `[0, 1]`.
    pub confidence_score: f64,
    /// Which subsystem identified the need, if known.
    pub identified_by: Option<String>,
}

impl NeuronBlueprint {
    pub fn new(name: impl Into<String>, unit_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            rationale: String::new(),
            unit_type: unit_type.into(),
            subscribed_topics: BTreeSet::new(),
            capabilities: BTreeSet::new(),
            message_handlers: Vec::new(),
            has_autonomous_tick: false,
            tick_description: None,
            confidence_score: 0.5,
            identified_by: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.subscribed_topics.insert(topic.into());
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.message_handlers.push(handler.into());
        self
    }

    pub fn with_autonomous_tick(mut self, description: impl Into<String>) -> Self {
        self.has_autonomous_tick = true;
        self.tick_description = Some(description.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence_score = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_identified_by(mut self, subsystem: impl Into<String>) -> Self {
        self.identified_by = Some(subsystem.into());
        self
    }
}

/// Verdict from symbolic validation of a blueprint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymbolicValidation {
    /// Whether the blueprint is structurally sound.
    pub is_valid: bool,
    /// Aggregate safety score in `[0, 1]`.
    pub safety_score: f64,
    /// Hard violations; non-empty implies `is_valid == false`.
    pub violations: Vec<String>,
    /// Soft findings that do not block acceptance.
    pub warnings: Vec<String>,
    /// The symbolic form the verdict was derived from.
    pub symbolic_expression: String,
}

impl SymbolicValidation {
    pub fn passing(safety_score: f64, symbolic_expression: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            safety_score: safety_score.clamp(0.0, 1.0),
            violations: Vec::new(),
            warnings: Vec::new(),
            symbolic_expression: symbolic_expression.into(),
        }
    }

    pub fn failing(violations: Vec<String>, symbolic_expression: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            safety_score: 0.0,
            violations,
            warnings: Vec::new(),
            symbolic_expression: symbolic_expression.into(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_fields() {
        let blueprint = NeuronBlueprint::new("anomaly-watcher", "sensor")
            .with_description("Watches telemetry for anomalies")
            .with_rationale("Repeated unexplained spikes in queue depth")
            .with_topic("telemetry.queue")
            .with_topic("telemetry.cpu")
            .with_capability("message_bus")
            .with_handler("on_sample")
            .with_autonomous_tick("Recompute baselines every minute")
            .with_confidence(0.85)
            .with_identified_by("coherence-monitor");

        assert_eq!(blueprint.name, "anomaly-watcher");
        assert_eq!(blueprint.subscribed_topics.len(), 2);
        assert!(blueprint.has_autonomous_tick);
        assert_eq!(blueprint.message_handlers, vec!["on_sample"]);
        assert_eq!(blueprint.identified_by.as_deref(), Some("coherence-monitor"));
    }

    #[test]
    fn confidence_is_clamped() {
        let blueprint = NeuronBlueprint::new("u", "sensor").with_confidence(1.7);
        assert_eq!(blueprint.confidence_score, 1.0);
        let blueprint = NeuronBlueprint::new("u", "sensor").with_confidence(-0.2);
        assert_eq!(blueprint.confidence_score, 0.0);
    }

    #[test]
    fn validation_constructors() {
        let pass = SymbolicValidation::passing(0.92, "(validate-unit u 0.92)");
        assert!(pass.is_valid);
        assert!(pass.violations.is_empty());

        let fail = SymbolicValidation::failing(
            vec!["unbounded recursion in tick".into()],
            "(validate-unit u 0.00)",
        );
        assert!(!fail.is_valid);
        assert_eq!(fail.safety_score, 0.0);
    }
}
