//! Static security scan of generated source.
//!
//! A line-oriented pattern check, not a parser: any reference to a
//! forbidden namespace fails the proposal, with no allowance for how the
//! reference is spelled or whether it is reachable. The sandbox is the
//! second line of defense; this scan exists so code that plainly reaches
//! for the network or the process table never gets that far.

use tracing::warn;

/// One forbidden-namespace hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanViolation {
    /// The forbidden namespace that matched.
    pub namespace: String,
    /// 1-based line number of the hit.
    pub line: usize,
    /// The offending line, trimmed.
    pub snippet: String,
}

/// Scans source text for references to forbidden namespaces.
pub struct SecurityScanner {
    forbidden_namespaces: Vec<String>,
}

impl SecurityScanner {
    pub fn new(forbidden_namespaces: Vec<String>) -> Self {
        Self {
            forbidden_namespaces,
        }
    }

    /// All hits, in line order.
    pub fn scan(&self, source: &str) -> Vec<ScanViolation> {
        let mut violations = Vec::new();
        for (index, line) in source.lines().enumerate() {
            for namespace in &self.forbidden_namespaces {
                if line.contains(namespace.as_str()) {
                    warn!(
                        namespace = %namespace,
                        line = index + 1,
                        "Forbidden namespace in generated code",
                    );
                    violations.push(ScanViolation {
                        namespace: namespace.clone(),
                        line: index + 1,
                        snippet: line.trim().to_string(),
                    });
                }
            }
        }
        violations
    }

    /// First hit, if any.
    pub fn first_violation(&self, source: &str) -> Option<ScanViolation> {
        self.scan(source).into_iter().next()
    }

    pub fn is_clean(&self, source: &str) -> bool {
        self.first_violation(source).is_none()
    }
}
