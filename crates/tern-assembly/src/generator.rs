//! Code generation seam.

use anyhow::bail;

use crate::blueprint::NeuronBlueprint;

/// Produces unit source code from a blueprint.
///
/// Production implementations wrap a model call; the engine only sees
/// the returned source, which still has to clear the security scan and
/// the sandbox.
pub trait UnitCodeGenerator: Send + Sync {
    fn generate(&self, blueprint: &NeuronBlueprint) -> anyhow::Result<String>;

    fn name(&self) -> &str;
}

// ── Test double ─────────────────────────────────────────────────────────

enum GeneratorBehavior {
    Skeleton,
    Fixed(String),
    Fail(String),
}

/// Generator double: emits a deterministic skeleton, a fixed source
/// string, or an error.
pub struct SimulatedGenerator {
    behavior: GeneratorBehavior,
}

impl SimulatedGenerator {
    /// Emits a skeleton derived from the blueprint.
    pub fn new() -> Self {
        Self {
            behavior: GeneratorBehavior::Skeleton,
        }
    }

    /// Always emits exactly `source`.
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            behavior: GeneratorBehavior::Fixed(source.into()),
        }
    }

    /// Always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: GeneratorBehavior::Fail(message.into()),
        }
    }
}

impl Default for SimulatedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitCodeGenerator for SimulatedGenerator {
    fn generate(&self, blueprint: &NeuronBlueprint) -> anyhow::Result<String> {
        match &self.behavior {
            GeneratorBehavior::Skeleton => {
                let mut source = String::new();
                source.push_str(&format!("// unit: {}\n", blueprint.name));
                for topic in &blueprint.subscribed_topics {
                    source.push_str(&format!("// subscribes: {}\n", topic));
                }
                for handler in &blueprint.message_handlers {
                    source.push_str(&format!(
                        "fn {}(message: &NeuralMessage) -> anyhow::Result<()> {{ Ok(()) }}\n",
                        handler,
                    ));
                }
                if blueprint.has_autonomous_tick {
                    source.push_str("fn tick() -> anyhow::Result<()> { Ok(()) }\n");
                }
                Ok(source)
            }
            GeneratorBehavior::Fixed(source) => Ok(source.clone()),
            GeneratorBehavior::Fail(message) => bail!("{}", message),
        }
    }

    fn name(&self) -> &str {
        "simulated-generator"
    }
}
