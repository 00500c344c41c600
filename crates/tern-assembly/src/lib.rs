//! # tern-assembly
//!
//! Self-assembly engine: the system proposes new units for itself as
//! [`NeuronBlueprint`]s, and [`SelfAssemblyEngine`] drives each one
//! through symbolic validation, code generation, approval, a static
//! security scan, sandboxed construction, and registration. Nothing a
//! model produced runs outside the sandbox until every gate has passed,
//! and every proposal keeps a full state history.
//!
//! The model-facing seams — [`SymbolicValidator`], [`UnitCodeGenerator`],
//! [`UnitSandbox`] — are traits, with `Simulated*` doubles for tests and
//! demos.

#![deny(unsafe_code)]

pub mod blueprint;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod generator;
pub mod proposal;
pub mod sandbox;
pub mod scan;
pub mod unit;
pub mod validator;

// Re-exports
pub use blueprint::{NeuronBlueprint, SymbolicValidation};
pub use config::AssemblyConfig;
pub use engine::SelfAssemblyEngine;
pub use error::{AssemblyError, AssemblyResult};
pub use events::{AssemblyEvent, EventBus};
pub use generator::{SimulatedGenerator, UnitCodeGenerator};
pub use proposal::{AssemblyProposal, ProposalId, ProposalStatus, StateTransition};
pub use sandbox::{SimulatedSandbox, UnitSandbox};
pub use scan::{ScanViolation, SecurityScanner};
pub use unit::{topic_matches, AssembledUnit, NeuralMessage, SimulatedUnit};
pub use validator::{SimulatedValidator, SymbolicValidator};
