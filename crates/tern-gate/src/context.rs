//! Execution context passed to safety criteria.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ambient context a criterion may consult when judging a call.
///
/// Criteria are assumed pure with respect to this context: they read it,
/// they do not mutate it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GateContext {
    /// Key/value context (caller identity, session, task description).
    pub metadata: BTreeMap<String, String>,
}

impl GateContext {
    /// Empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a context entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a context entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_lookup() {
        let ctx = GateContext::new().with("caller", "planner");
        assert_eq!(ctx.get("caller"), Some("planner"));
        assert_eq!(ctx.get("absent"), None);
    }
}
