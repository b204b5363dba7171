//! covharness - coverage instrumentation for Go binaries
//!
//! Instruments every internal package of a Go program with `go tool cover`,
//! synthesizes a harness that registers the generated counters and writes a
//! coverage profile, and merges that harness into the program's entry file.

pub mod core;
pub mod errors;
pub mod ops;
pub mod report;
pub mod syntax;
pub mod toolchain;
pub mod util;

/// Test utilities for covharness unit tests.
///
/// This module is only available when running tests. It provides a fake Go
/// toolchain and small Go packages written to temporary directories.
#[cfg(test)]
pub mod test_support;

pub use core::{CoverMode, CoverageManifest, CoverageVariable, GoPackage};
pub use errors::{CoverError, CoverResult};
pub use toolchain::{GoTool, GoToolchain};
pub use util::context::GlobalContext;
