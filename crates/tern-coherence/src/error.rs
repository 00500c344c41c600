//! Coherence error types.

use thiserror::Error;

use tern_types::Form;

/// Errors from response aggregation.
#[derive(Debug, Error)]
pub enum CoherenceError {
    /// Aggregation was asked to pick from nothing.
    #[error("No responses to aggregate")]
    NoResponses,

    /// The ensemble's bucketed signal did not resolve to a clear Mark.
    #[error("No clear consensus among responses (combined verdict: {})", .0.name())]
    NoClearConsensus(Form),
}

/// Result type for coherence operations.
pub type CoherenceResult<T> = Result<T, CoherenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert!(CoherenceError::NoResponses.to_string().contains("No responses"));
        let err = CoherenceError::NoClearConsensus(Form::Imaginary);
        assert!(err.to_string().contains("No clear consensus"));
        assert!(err.to_string().contains("Imaginary"));
    }
}
