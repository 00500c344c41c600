//! Gate error types.

use thiserror::Error;

use crate::approvals::ApprovalToken;

/// Errors from the approval queue and gate plumbing.
#[derive(Debug, Error)]
pub enum GateError {
    /// The token does not exist or was already resolved, cancelled, or
    /// timed out — tokens are single-use.
    #[error("approval token {0} not found or already resolved")]
    TokenNotFound(ApprovalToken),
}

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;
