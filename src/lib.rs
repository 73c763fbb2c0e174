#![forbid(unsafe_code)]
//! Driver for the refined wrapper generator.
//!
//! `refine-gen` scans a crate's source tree for `#[refined(...)]` placeholders, runs the generator engine
//! (`refine_core`) over the whole tree at once, and writes one formatted unit per wrapper. The same engine backs the
//! `refine!` macro of the `refine` runtime crate.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! ## See also
//!
//! - [`project`]: source discovery and output writing
//! - [`report`]: diagnostic rendering

pub mod cli;
pub mod project;
pub mod report;

pub use project::{DriverConfig, ProjectError};
