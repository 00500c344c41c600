//! Deployed units and the messages they handle.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message on the internal bus.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NeuralMessage {
    pub topic: String,
    pub payload: serde_json::Value,
    /// Originating unit, if any.
    pub source: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl NeuralMessage {
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            source: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A constructed, registered unit.
///
/// Implementations come out of a [`UnitSandbox`](crate::UnitSandbox);
/// the engine only ever holds them behind `Arc<dyn AssembledUnit>`.
pub trait AssembledUnit: Send + Sync {
    /// Registration name; unique among deployed units.
    fn name(&self) -> &str;

    /// Topic patterns this unit receives. `"prefix.*"` matches any topic
    /// under the prefix.
    fn subscriptions(&self) -> BTreeSet<String>;

    /// Handle one message.
    fn handle(&self, message: &NeuralMessage) -> anyhow::Result<()>;
}

/// Whether a subscription pattern matches a concrete topic.
///
/// Exact match, or a trailing `.*` wildcard: `"telemetry.*"` matches
/// `"telemetry.cpu"` and `"telemetry.queue.depth"` but not
/// `"telemetry"` itself.
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    match pattern.strip_suffix(".*") {
        Some(prefix) => topic
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.')),
        None => pattern == topic,
    }
}

// ── Test double ─────────────────────────────────────────────────────────

/// In-memory unit that counts the messages it handles.
#[derive(Clone)]
pub struct SimulatedUnit {
    name: String,
    subscriptions: BTreeSet<String>,
    handled: Arc<AtomicUsize>,
}

impl SimulatedUnit {
    pub fn new(name: impl Into<String>, subscriptions: BTreeSet<String>) -> Self {
        Self {
            name: name.into(),
            subscriptions,
            handled: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn handled_count(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }
}

impl AssembledUnit for SimulatedUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscriptions(&self) -> BTreeSet<String> {
        self.subscriptions.clone()
    }

    fn handle(&self, _message: &NeuralMessage) -> anyhow::Result<()> {
        self.handled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_topic_match() {
        assert!(topic_matches("telemetry.cpu", "telemetry.cpu"));
        assert!(!topic_matches("telemetry.cpu", "telemetry.queue"));
    }

    #[test]
    fn wildcard_matches_subtree_only() {
        assert!(topic_matches("telemetry.*", "telemetry.cpu"));
        assert!(topic_matches("telemetry.*", "telemetry.queue.depth"));
        assert!(!topic_matches("telemetry.*", "telemetry"));
        assert!(!topic_matches("telemetry.*", "telemetrics.cpu"));
    }

    #[test]
    fn simulated_unit_counts_messages() {
        let unit = SimulatedUnit::new("u", BTreeSet::from(["telemetry.*".to_string()]));
        let message = NeuralMessage::new("telemetry.cpu", serde_json::json!({"load": 0.4}));
        unit.handle(&message).unwrap();
        unit.handle(&message).unwrap();
        assert_eq!(unit.handled_count(), 2);
    }
}
