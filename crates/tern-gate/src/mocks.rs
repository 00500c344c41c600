//! Test doubles for the gate: fixed-verdict criteria, counting/failing
//! tools, and static resolvers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::bail;

use tern_types::{Form, ToolCall};

use crate::context::GateContext;
use crate::executor::{CriterionOutcome, SafetyCriterion, ToolHandler, UncertaintyResolver};

/// A criterion that always returns the same verdict.
pub struct StaticCriterion {
    name: String,
    verdict: Form,
}

impl StaticCriterion {
    pub fn new(name: impl Into<String>, verdict: Form) -> Self {
        Self {
            name: name.into(),
            verdict,
        }
    }
}

impl SafetyCriterion for StaticCriterion {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, _call: &ToolCall, _ctx: &GateContext) -> anyhow::Result<CriterionOutcome> {
        Ok(CriterionOutcome {
            verdict: self.verdict,
            details: format!("static verdict {}", self.verdict.name()),
        })
    }
}

/// A criterion that always errors, for fault-boundary tests.
pub struct FailingCriterion {
    name: String,
    message: String,
}

impl FailingCriterion {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl SafetyCriterion for FailingCriterion {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, _call: &ToolCall, _ctx: &GateContext) -> anyhow::Result<CriterionOutcome> {
        bail!("{}", self.message)
    }
}

/// A tool that counts its invocations and echoes the call arguments.
#[derive(Clone)]
pub struct CountingTool {
    name: String,
    invocations: Arc<AtomicUsize>,
}

impl CountingTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many times the tool ran.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl ToolHandler for CountingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, call: &ToolCall) -> anyhow::Result<serde_json::Value> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(call.arguments.clone())
    }
}

/// A tool that always fails functionally.
pub struct FailingTool {
    name: String,
    message: String,
}

impl FailingTool {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl ToolHandler for FailingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, _call: &ToolCall) -> anyhow::Result<serde_json::Value> {
        bail!("{}", self.message)
    }
}

/// A resolver with a fixed answer.
pub struct StaticResolver {
    approve: bool,
}

impl StaticResolver {
    pub fn approving() -> Self {
        Self { approve: true }
    }

    pub fn declining() -> Self {
        Self { approve: false }
    }
}

impl UncertaintyResolver for StaticResolver {
    fn resolve(&self, _call: &ToolCall, _ctx: &GateContext) -> bool {
        self.approve
    }
}
