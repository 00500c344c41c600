//! # tern-types
//!
//! Foundation types for the Tern safety-decision kernel.
//!
//! - [`Form`] — three-valued truth: Mark (affirmed), Void (denied),
//!   Imaginary (irreducibly uncertain), with combinators that let
//!   uncertainty propagate instead of being silently resolved.
//! - [`AuditableDecision`] / [`Evidence`] — decisions bundled with the
//!   ordered evidence trail that produced them.
//! - [`ToolCall`], [`Claim`], [`LlmResponse`] — the message-layer types the
//!   gate and coherence crates operate on.

#![deny(unsafe_code)]

pub mod decision;
pub mod form;
pub mod message;

// Re-exports
pub use decision::{AuditableDecision, Evidence};
pub use form::Form;
pub use message::{Claim, LlmResponse, ToolCall};
