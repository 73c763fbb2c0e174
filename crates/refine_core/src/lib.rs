#![forbid(unsafe_code)]
//! Capability detection and wrapper synthesis for refined types.
//!
//! Given a set of Rust source units, the engine finds unit-struct placeholders marked `#[refine::refined(Base, ..)]`,
//! works out what the base type can do and which hooks the wrapper implements, and synthesizes the wrapper itself:
//! storage, validated construction, and the subset of equality, ordering, display and conversion impls that both the
//! requested options and the base type's capabilities license.
//!
//! Pipeline, leaves first:
//! - [`scanner`]: candidate discovery by marker identity
//! - [`options`]: option flag folding
//! - [`hooks`]: hook trait discovery
//! - [`prober`]: capability probing over a [`semantic::SemanticModel`] (backed by [`catalog::TypeCatalog`])
//! - [`synth`]: the decision table and token emission
//! - [`generator`]: the entry point tying the stages together
//!
//! ## Notes
//!
//! - No IO and no global state. The CLI and the proc-macro crate own input discovery and output.
//! - Errors are per candidate ([`GenerationError`]); one bad declaration never stops the rest of the run.

pub mod catalog;
pub mod compilation;
pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod generator;
pub mod hooks;
pub mod options;
pub mod paths;
pub mod prober;
pub mod scanner;
pub mod semantic;
pub mod synth;

pub use compilation::{Compilation, SourceUnit};
pub use config::GeneratorConfig;
pub use descriptor::WrapperDescriptor;
pub use diagnostics::{Diagnostic, GenerationError, Location, Severity};
pub use generator::{Analysis, CandidateOutcome, analyze, generate};
pub use options::Options;
pub use paths::ModulePath;
pub use synth::{render, synthesize};
