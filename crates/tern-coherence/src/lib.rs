//! # tern-coherence
//!
//! Output-coherence checks for the Tern kernel.
//!
//! - [`ContradictionDetector`] — splits model output into atomic claims
//!   and flags contradictory pairs, within one output or across an
//!   ensemble. A contradiction surfaces as Imaginary: the detector flags
//!   inconsistency, it does not decide which side is right.
//! - [`ConfidencePipeline`] — gates, routes, filters, and aggregates
//!   confidence-scored responses with the same algebra, so a denial or an
//!   open uncertainty is never silently outvoted.

#![deny(unsafe_code)]

pub mod contradiction;
pub mod error;
pub mod extractor;
pub mod pipeline;

// Re-exports
pub use contradiction::{CoherenceReport, ContradictionDetector};
pub use error::{CoherenceError, CoherenceResult};
pub use extractor::{ClaimExtractor, SimpleClaimExtractor};
pub use pipeline::ConfidencePipeline;
