//! Core data structures for covharness.
//!
//! - Package metadata as reported by `go list`
//! - Coverage variables and their naming
//! - The coverage manifest built during instrumentation

pub mod cover_mode;
pub mod cover_var;
pub mod manifest;
pub mod module;

pub use cover_mode::CoverMode;
pub use cover_var::{CoverageVariable, VarNames};
pub use manifest::{CoverageManifest, ModuleCoverage};
pub use module::GoPackage;
