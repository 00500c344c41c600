//! # tern-gate
//!
//! The tool-safety gate for the Tern kernel.
//!
//! - [`SafeToolExecutor`] — evaluates an ordered registry of named safety
//!   criteria against a requested tool call, combines the verdicts with
//!   the Form algebra, and only invokes the tool on a clear Mark. Voids
//!   reject; Imaginaries escalate to an [`UncertaintyResolver`] hook or
//!   come back as uncertain decisions with a full evidence trail.
//! - [`ToolApprovalQueue`] — holds uncertain verdicts pending external
//!   resolution, with bounded waits, cancellation, and single-use tokens.

#![deny(unsafe_code)]

pub mod approvals;
pub mod context;
pub mod criteria;
pub mod error;
pub mod executor;
pub mod mocks;

// Re-exports
pub use approvals::{ApprovalToken, PendingApproval, ToolApprovalQueue};
pub use context::GateContext;
pub use criteria::{ArgumentSizeBound, ConfidenceFloor, ForbiddenToolPattern};
pub use error::{GateError, GateResult};
pub use executor::{
    CriterionOutcome, SafeToolExecutor, SafetyCriterion, ToolHandler, UncertaintyResolver,
};
