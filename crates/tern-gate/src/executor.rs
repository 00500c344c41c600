//! The tool-safety gate.
//!
//! `SafeToolExecutor` evaluates an ordered registry of named safety
//! criteria against a requested tool call, combines their verdicts with
//! the Form algebra, and only invokes the tool on a clear Mark. A Void
//! rejects; an Imaginary either escalates to a human-resolution hook or
//! returns an uncertain decision. Every path returns a fully populated
//! evidence trail.

use std::collections::HashMap;

use tracing::{debug, warn};

use tern_types::{AuditableDecision, Evidence, Form, ToolCall};

use crate::context::GateContext;

// ── Criterion contract ──────────────────────────────────────────────────

/// Verdict and detail from one safety criterion.
#[derive(Clone, Debug)]
pub struct CriterionOutcome {
    /// The criterion's verdict.
    pub verdict: Form,
    /// Detail behind the verdict, recorded in the evidence trail.
    pub details: String,
}

impl CriterionOutcome {
    /// Affirming outcome.
    pub fn pass(details: impl Into<String>) -> Self {
        Self {
            verdict: Form::Mark,
            details: details.into(),
        }
    }

    /// Denying outcome.
    pub fn deny(details: impl Into<String>) -> Self {
        Self {
            verdict: Form::Void,
            details: details.into(),
        }
    }

    /// Undecided outcome.
    pub fn undecided(details: impl Into<String>) -> Self {
        Self {
            verdict: Form::Imaginary,
            details: details.into(),
        }
    }
}

/// A named guard predicate over a requested call.
///
/// An `Err` from `evaluate` is recorded as Imaginary with the error text
/// as description — a misbehaving criterion can degrade posture to
/// uncertain but can never crash the gate or silently grant approval.
pub trait SafetyCriterion: Send + Sync {
    /// Name of this criterion, used in evidence and reasoning.
    fn name(&self) -> &str;

    /// Judge the call in its context.
    fn evaluate(&self, call: &ToolCall, ctx: &GateContext) -> anyhow::Result<CriterionOutcome>;
}

/// A named executable tool.
pub trait ToolHandler: Send + Sync {
    /// Registered name of the tool.
    fn name(&self) -> &str;

    /// Invoke the tool. Failures here are functional tool failures, not
    /// gate denials.
    fn invoke(&self, call: &ToolCall) -> anyhow::Result<serde_json::Value>;
}

/// Hook that resolves an uncertain gate verdict, typically by asking a
/// human reviewer.
pub trait UncertaintyResolver: Send + Sync {
    /// `true` approves the call, `false` declines it.
    fn resolve(&self, call: &ToolCall, ctx: &GateContext) -> bool;
}

// ── Executor ────────────────────────────────────────────────────────────

/// Criteria-gated tool executor.
pub struct SafeToolExecutor {
    tools: HashMap<String, Box<dyn ToolHandler>>,
    criteria: Vec<Box<dyn SafetyCriterion>>,
    resolver: Option<Box<dyn UncertaintyResolver>>,
}

impl SafeToolExecutor {
    /// Create an executor with no tools, criteria, or resolver.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            criteria: Vec::new(),
            resolver: None,
        }
    }

    /// Register a tool under its own name.
    pub fn register_tool(&mut self, tool: Box<dyn ToolHandler>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Append a criterion. Criteria run in registration order.
    pub fn add_criterion(&mut self, criterion: Box<dyn SafetyCriterion>) {
        self.criteria.push(criterion);
    }

    /// Install the uncertainty-resolution hook.
    pub fn with_resolver(mut self, resolver: Box<dyn UncertaintyResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Names of registered tools.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Gate and, on a clear Mark, execute the call.
    pub fn execute_with_audit(
        &self,
        call: &ToolCall,
        ctx: &GateContext,
    ) -> AuditableDecision<serde_json::Value> {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "Requested tool not found");
            return AuditableDecision::reject(format!("tool '{}' not found", call.name))
                .with_metadata("tool", &call.name);
        };

        // Evaluate every criterion in registration order; criterion faults
        // become Imaginary evidence, never a panic or early exit.
        let mut trail: Vec<Evidence> = Vec::with_capacity(self.criteria.len());
        for criterion in &self.criteria {
            let (verdict, details) = match criterion.evaluate(call, ctx) {
                Ok(outcome) => (outcome.verdict, outcome.details),
                Err(err) => (Form::Imaginary, err.to_string()),
            };
            debug!(criterion = criterion.name(), verdict = %verdict, "Criterion evaluated");
            trail.push(Evidence::new(criterion.name(), verdict, details));
        }

        let combined = Form::all(trail.iter().map(|e| e.evaluation));
        match combined {
            Form::Void => {
                // First denial wins the reasoning; the tool is never invoked.
                let failing = trail
                    .iter()
                    .find(|e| e.evaluation.is_void())
                    .map(|e| e.criterion_name.clone())
                    .unwrap_or_default();
                warn!(tool = %call.name, criterion = %failing, "Call denied by criterion");
                AuditableDecision::reject(format!("Denied by criterion '{}'", failing))
                    .with_evidence_trail(trail)
                    .with_metadata("tool", &call.name)
            }
            Form::Mark => self.invoke(tool.as_ref(), call, trail),
            Form::Imaginary => match &self.resolver {
                Some(resolver) => {
                    let approved = resolver.resolve(call, ctx);
                    trail.push(Evidence::new(
                        "human_approval",
                        Form::from(approved),
                        if approved {
                            "approved by human reviewer"
                        } else {
                            "declined by human reviewer"
                        },
                    ));
                    if approved {
                        self.invoke(tool.as_ref(), call, trail)
                    } else {
                        AuditableDecision::reject("Human review declined")
                            .with_evidence_trail(trail)
                            .with_metadata("tool", &call.name)
                    }
                }
                None => {
                    let undecided: Vec<&str> = trail
                        .iter()
                        .filter(|e| e.evaluation.is_imaginary())
                        .map(|e| e.criterion_name.as_str())
                        .collect();
                    AuditableDecision::uncertain(format!(
                        "Uncertain state: criteria [{}] could not decide",
                        undecided.join(", "),
                    ))
                    .with_evidence_trail(trail)
                    .with_metadata("tool", &call.name)
                }
            },
        }
    }

    /// Invoke a tool whose gate passed. The gate's Mark certainty stands
    /// even when the tool itself fails functionally.
    fn invoke(
        &self,
        tool: &dyn ToolHandler,
        call: &ToolCall,
        trail: Vec<Evidence>,
    ) -> AuditableDecision<serde_json::Value> {
        match tool.invoke(call) {
            Ok(value) => {
                debug!(tool = %call.name, "Tool executed");
                AuditableDecision::approve(value, "all criteria passed")
                    .with_evidence_trail(trail)
                    .with_metadata("tool", &call.name)
            }
            Err(err) => {
                warn!(tool = %call.name, error = %err, "Tool failed after gate passed");
                AuditableDecision::new(
                    Err(err.to_string()),
                    Form::Mark,
                    "gate passed; tool execution failed",
                )
                .with_evidence_trail(trail)
                .with_metadata("tool", &call.name)
            }
        }
    }
}

impl Default for SafeToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}
