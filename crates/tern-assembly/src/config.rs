//! Engine configuration.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the self-assembly engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Skip human approval when the blueprint's own confidence clears
    /// [`auto_approve_threshold`](Self::auto_approve_threshold).
    pub auto_approve: bool,
    /// Minimum blueprint confidence for auto-approval.
    pub auto_approve_threshold: f64,
    /// Minimum symbolic-validation safety score to accept a submission.
    pub min_safety_score: f64,
    /// Hard ceiling on concurrently deployed units.
    pub max_deployed_units: usize,
    /// Capabilities a blueprint may never request.
    pub forbidden_capabilities: BTreeSet<String>,
    /// Namespaces generated code may never reference.
    pub forbidden_namespaces: Vec<String>,
    /// Wall-clock limit on sandbox construction, in milliseconds.
    pub sandbox_timeout_ms: u64,
}

impl AssemblyConfig {
    pub fn sandbox_timeout(&self) -> Duration {
        Duration::from_millis(self.sandbox_timeout_ms)
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            auto_approve: false,
            auto_approve_threshold: 0.9,
            min_safety_score: 0.7,
            max_deployed_units: 16,
            forbidden_capabilities: [
                "process_execution",
                "network_access",
                "raw_file_io",
                "self_replication",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            forbidden_namespaces: [
                "std::process",
                "std::net",
                "std::fs",
                "tokio::net",
                "tokio::process",
                "libc",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            sandbox_timeout_ms: 5_000,
        }
    }
}
