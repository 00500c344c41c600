//! Sandboxed unit construction seam.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;

use crate::blueprint::NeuronBlueprint;
use crate::unit::{AssembledUnit, SimulatedUnit};

/// Builds a live unit from scanned source, in isolation.
///
/// The engine bounds every call with its configured timeout, so an
/// implementation that hangs costs one failed proposal, not a wedged
/// pipeline.
#[async_trait]
pub trait UnitSandbox: Send + Sync {
    async fn construct(
        &self,
        blueprint: &NeuronBlueprint,
        source: &str,
    ) -> anyhow::Result<Arc<dyn AssembledUnit>>;

    fn name(&self) -> &str;
}

// ── Test double ─────────────────────────────────────────────────────────

enum SandboxBehavior {
    Construct,
    Fail(String),
    Hang,
}

/// Sandbox double: constructs a [`SimulatedUnit`], fails, or hangs until
/// the engine's timeout fires.
pub struct SimulatedSandbox {
    behavior: SandboxBehavior,
}

impl SimulatedSandbox {
    /// Constructs a counting unit carrying the blueprint's name and
    /// subscriptions.
    pub fn new() -> Self {
        Self {
            behavior: SandboxBehavior::Construct,
        }
    }

    /// Construction always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: SandboxBehavior::Fail(message.into()),
        }
    }

    /// Construction never completes.
    pub fn hanging() -> Self {
        Self {
            behavior: SandboxBehavior::Hang,
        }
    }
}

impl Default for SimulatedSandbox {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UnitSandbox for SimulatedSandbox {
    async fn construct(
        &self,
        blueprint: &NeuronBlueprint,
        _source: &str,
    ) -> anyhow::Result<Arc<dyn AssembledUnit>> {
        match &self.behavior {
            SandboxBehavior::Construct => Ok(Arc::new(SimulatedUnit::new(
                blueprint.name.clone(),
                blueprint.subscribed_topics.clone(),
            ))),
            SandboxBehavior::Fail(message) => bail!("{}", message),
            SandboxBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                bail!("unreachable: hang elapsed")
            }
        }
    }

    fn name(&self) -> &str {
        "simulated-sandbox"
    }
}
