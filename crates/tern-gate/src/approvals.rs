//! Asynchronous human-approval queue.
//!
//! Holds uncertain gate verdicts pending external resolution. Each entry is
//! keyed by an opaque single-use token; resolution, cancellation, and
//! timeout are mutually exclusive terminal events — exactly one fires per
//! token, arbitrated by removal under the map mutex, and the token is inert
//! afterward.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use tern_types::{AuditableDecision, Evidence, Form, ToolCall};

use crate::error::{GateError, GateResult};

// ── Token ───────────────────────────────────────────────────────────────

/// Opaque single-use handle to a queued approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalToken(uuid::Uuid);

impl ApprovalToken {
    /// Mint a fresh token.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ApprovalToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ApprovalToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Pending entries ─────────────────────────────────────────────────────

/// A call waiting for external resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingApproval {
    /// The queue token.
    pub token: ApprovalToken,
    /// The call awaiting approval.
    pub call: ToolCall,
    /// The uncertain decision that sent the call here.
    pub original_decision: AuditableDecision<serde_json::Value>,
    /// When the call was queued.
    pub queued_at: DateTime<Utc>,
}

struct PendingEntry {
    pending: PendingApproval,
    notify: Option<oneshot::Sender<AuditableDecision<serde_json::Value>>>,
}

// ── Queue ───────────────────────────────────────────────────────────────

/// Thread-safe queue of verdicts pending human resolution.
#[derive(Clone, Default)]
pub struct ToolApprovalQueue {
    entries: Arc<Mutex<HashMap<ApprovalToken, PendingEntry>>>,
}

impl ToolApprovalQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a call for later resolution. Non-blocking.
    pub fn enqueue(
        &self,
        call: ToolCall,
        decision: AuditableDecision<serde_json::Value>,
    ) -> ApprovalToken {
        let token = self.insert(call, decision, None);
        info!(%token, "Call queued for approval");
        token
    }

    /// Queue a call and wait for its terminal event.
    ///
    /// A resolution or cancellation returns that outcome. If the timeout
    /// elapses first, the entry is removed and an uncertain decision whose
    /// reasoning contains "timed out" is returned — no orphaned entries
    /// survive a timeout. `None` waits indefinitely.
    pub async fn enqueue_and_wait(
        &self,
        call: ToolCall,
        decision: AuditableDecision<serde_json::Value>,
        timeout: Option<Duration>,
    ) -> AuditableDecision<serde_json::Value> {
        let tool_name = call.name.clone();
        let (tx, mut rx) = oneshot::channel();
        let token = self.insert(call, decision, Some(tx));
        info!(%token, tool = %tool_name, "Call queued; caller waiting");

        match timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut rx).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => Self::dropped_decision(&tool_name),
                Err(_elapsed) => {
                    // Deadline hit: removal under the lock decides whether
                    // the timeout or a concurrent resolver wins.
                    let removed = self
                        .entries
                        .lock()
                        .expect("approval queue lock poisoned")
                        .remove(&token)
                        .is_some();
                    if removed {
                        warn!(%token, tool = %tool_name, "Approval wait timed out");
                        AuditableDecision::uncertain(format!(
                            "Approval for '{}' timed out after {:?}",
                            tool_name, limit,
                        ))
                        .with_metadata("tool", &tool_name)
                    } else {
                        // Lost the removal race: a resolver or canceller
                        // owns the entry and sends its outcome right after
                        // removing, so wait for the in-flight send rather
                        // than sampling the channel.
                        match (&mut rx).await {
                            Ok(outcome) => outcome,
                            Err(_) => Self::dropped_decision(&tool_name),
                        }
                    }
                }
            },
            None => match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Self::dropped_decision(&tool_name),
            },
        }
    }

    /// Resolve a pending entry. Removes it, builds the resolved decision
    /// (appending `human_approval` evidence to the original trail), and
    /// wakes any waiter. Unknown or already-resolved tokens error —
    /// tokens are single-use.
    pub fn resolve(
        &self,
        token: &ApprovalToken,
        approved: bool,
        notes: impl Into<String>,
    ) -> GateResult<AuditableDecision<serde_json::Value>> {
        let entry = self
            .entries
            .lock()
            .expect("approval queue lock poisoned")
            .remove(token)
            .ok_or(GateError::TokenNotFound(*token))?;

        let outcome = Self::build_resolution(&entry.pending, approved, notes.into());
        info!(%token, approved, "Approval resolved");
        if let Some(notify) = entry.notify {
            // The waiter may have timed out between our removal and here;
            // a failed send is fine, the map removal already decided.
            let _ = notify.send(outcome.clone());
        }
        Ok(outcome)
    }

    /// Cancel a pending entry. A waiting caller receives a rejection with
    /// reasoning "cancelled". Returns whether an entry was found.
    pub fn cancel(&self, token: &ApprovalToken) -> bool {
        let entry = self
            .entries
            .lock()
            .expect("approval queue lock poisoned")
            .remove(token);
        match entry {
            Some(entry) => {
                info!(%token, "Approval cancelled");
                if let Some(notify) = entry.notify {
                    let outcome = AuditableDecision::reject("cancelled")
                        .with_evidence_trail(entry.pending.original_decision.evidence_trail.clone())
                        .with_metadata("tool", &entry.pending.call.name);
                    let _ = notify.send(outcome);
                }
                true
            }
            None => false,
        }
    }

    /// Snapshot of one pending entry.
    pub fn get_pending(&self, token: &ApprovalToken) -> Option<PendingApproval> {
        self.entries
            .lock()
            .expect("approval queue lock poisoned")
            .get(token)
            .map(|entry| entry.pending.clone())
    }

    /// Snapshot of all pending entries.
    pub fn pending_approvals(&self) -> Vec<PendingApproval> {
        self.entries
            .lock()
            .expect("approval queue lock poisoned")
            .values()
            .map(|entry| entry.pending.clone())
            .collect()
    }

    /// Number of entries awaiting resolution.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("approval queue lock poisoned")
            .len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(
        &self,
        call: ToolCall,
        decision: AuditableDecision<serde_json::Value>,
        notify: Option<oneshot::Sender<AuditableDecision<serde_json::Value>>>,
    ) -> ApprovalToken {
        let token = ApprovalToken::new();
        let pending = PendingApproval {
            token,
            call,
            original_decision: decision,
            queued_at: Utc::now(),
        };
        self.entries
            .lock()
            .expect("approval queue lock poisoned")
            .insert(token, PendingEntry { pending, notify });
        token
    }

    /// Build the terminal decision for a resolved entry. The queue holds
    /// no tool registry, so an approval returns a Mark decision describing
    /// the approved call; the caller re-dispatches it through the executor.
    fn build_resolution(
        pending: &PendingApproval,
        approved: bool,
        notes: String,
    ) -> AuditableDecision<serde_json::Value> {
        let description = if notes.is_empty() {
            if approved {
                "approved by human reviewer".to_string()
            } else {
                "declined by human reviewer".to_string()
            }
        } else {
            notes
        };
        let base = if approved {
            AuditableDecision::approve(
                json!({ "tool": pending.call.name, "approved": true }),
                "Approved by human review",
            )
        } else {
            AuditableDecision::reject("Human review declined")
        };
        base.with_evidence_trail(pending.original_decision.evidence_trail.clone())
            .with_evidence(Evidence::new(
                "human_approval",
                Form::from(approved),
                description,
            ))
            .with_metadata("tool", &pending.call.name)
    }

    /// Terminal decision when a waiter's sender vanished without a send.
    /// Only reachable if the queue itself is dropped mid-wait.
    fn dropped_decision(tool_name: &str) -> AuditableDecision<serde_json::Value> {
        debug!(tool = %tool_name, "Approval channel dropped without resolution");
        AuditableDecision::reject("cancelled").with_metadata("tool", tool_name)
    }
}
