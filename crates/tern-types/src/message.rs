//! Shared message-layer types: tool calls, claims, and model responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A requested invocation of a named tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Registered tool name.
    pub name: String,
    /// Arguments as a JSON value (usually an object).
    pub arguments: serde_json::Value,
    /// Caller confidence in the call, clamped to [0, 1].
    pub confidence: f64,
}

impl ToolCall {
    /// Create a call with full confidence.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
            confidence: 1.0,
        }
    }

    /// Set the caller confidence (clamped to [0, 1]).
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

/// An atomic factual statement extracted from model output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// The statement text.
    pub statement: String,
    /// Extraction confidence, clamped to [0, 1].
    pub confidence: f64,
    /// Label of the output the claim came from.
    pub source: String,
}

impl Claim {
    /// Create a claim; confidence is clamped to [0, 1].
    pub fn new(statement: impl Into<String>, confidence: f64, source: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            confidence: confidence.clamp(0.0, 1.0),
            source: source.into(),
        }
    }
}

/// One model output with its self-reported confidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Response text.
    pub text: String,
    /// Model confidence, clamped to [0, 1].
    pub confidence: f64,
    /// Tool calls the model requested alongside the text.
    pub tool_calls: Vec<ToolCall>,
    /// Supplementary key/value context.
    pub metadata: BTreeMap<String, String>,
    /// Which model produced the response, if known.
    pub model_name: Option<String>,
    /// When the response was received.
    pub timestamp: DateTime<Utc>,
}

impl LlmResponse {
    /// Create a response; confidence is clamped to [0, 1].
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            tool_calls: Vec::new(),
            metadata: BTreeMap::new(),
            model_name: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach requested tool calls.
    pub fn with_tool_calls(mut self, calls: Vec<ToolCall>) -> Self {
        self.tool_calls = calls;
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Name the producing model.
    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_call_defaults_full_confidence() {
        let call = ToolCall::new("calculator", json!({"expr": "1+1"}));
        assert_eq!(call.confidence, 1.0);
    }

    #[test]
    fn tool_call_confidence_clamped() {
        let call = ToolCall::new("calculator", json!({})).with_confidence(1.7);
        assert_eq!(call.confidence, 1.0);
        let call = call.with_confidence(-0.2);
        assert_eq!(call.confidence, 0.0);
    }

    #[test]
    fn claim_confidence_clamped() {
        let claim = Claim::new("the sky is blue", 1.5, "model-a");
        assert_eq!(claim.confidence, 1.0);
    }

    #[test]
    fn response_builder() {
        let response = LlmResponse::new("done", 0.85)
            .with_model("model-a")
            .with_metadata("session", "s-1")
            .with_tool_calls(vec![ToolCall::new("search", json!({"q": "tides"}))]);
        assert_eq!(response.model_name.as_deref(), Some("model-a"));
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.metadata.get("session").unwrap(), "s-1");
    }

    #[test]
    fn response_confidence_clamped() {
        assert_eq!(LlmResponse::new("x", 2.0).confidence, 1.0);
        assert_eq!(LlmResponse::new("x", -1.0).confidence, 0.0);
    }
}
