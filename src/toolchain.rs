//! The external Go toolchain.
//!
//! The pipeline talks to `go` only through the [`GoTool`] trait: listing a
//! package and instrumenting one file. Tests substitute a deterministic fake.

use std::path::{Path, PathBuf};

use crate::core::{CoverMode, GoPackage};
use crate::errors::{CoverError, CoverResult};
use crate::util::process::{failure_message, find_go, ProcessBuilder};

/// One `go tool cover` invocation.
#[derive(Debug, Clone, Copy)]
pub struct CoverRequest<'a> {
    pub source: &'a Path,
    pub output: &'a Path,
    /// Identifier the rewritten file declares its counters under
    pub var: &'a str,
    pub mode: CoverMode,
}

/// Capability to run the Go toolchain. All calls block until the tool exits.
pub trait GoTool {
    /// Metadata of one package (`go list -json <spec>`).
    fn list(&self, spec: &str) -> CoverResult<GoPackage>;

    /// Write an instrumented copy of `req.source` to `req.output`.
    fn cover(&self, req: &CoverRequest<'_>) -> CoverResult<()>;
}

/// [`GoTool`] backed by a real `go` binary.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    go: PathBuf,
}

impl GoToolchain {
    pub fn new(go: impl Into<PathBuf>) -> Self {
        GoToolchain { go: go.into() }
    }

    /// Use the configured binary, else `$GOROOT/bin/go`, else `go` on PATH.
    pub fn detect(configured: Option<&Path>) -> Self {
        let go = configured
            .map(Path::to_path_buf)
            .or_else(find_go)
            .unwrap_or_else(|| PathBuf::from("go"));
        tracing::debug!("using go binary `{}`", go.display());
        GoToolchain { go }
    }

    fn list_command(&self, spec: &str) -> ProcessBuilder {
        ProcessBuilder::new(&self.go).args(["list", "-json", spec])
    }

    fn cover_command(&self, req: &CoverRequest<'_>) -> ProcessBuilder {
        ProcessBuilder::new(&self.go)
            .args(["tool", "cover"])
            .arg(format!("-mode={}", req.mode))
            .args(["-var", req.var, "-o"])
            .arg(req.output)
            .arg(req.source)
    }
}

impl GoTool for GoToolchain {
    fn list(&self, spec: &str) -> CoverResult<GoPackage> {
        let cmd = self.list_command(spec);
        let output = cmd.exec().map_err(|e| {
            CoverError::resolution(spec, format!("failed to run `{}`: {}", cmd.display_command(), e))
        })?;
        if !output.status.success() {
            return Err(CoverError::resolution(spec, failure_message(&output)));
        }

        GoPackage::from_json(&output.stdout).map_err(|e| {
            CoverError::resolution(spec, format!("undecodable `go list -json` output: {}", e))
        })
    }

    fn cover(&self, req: &CoverRequest<'_>) -> CoverResult<()> {
        let cmd = self.cover_command(req);
        let output = cmd.exec().map_err(|e| {
            CoverError::instrumentation(
                req.source,
                format!("failed to run `{}`: {}", cmd.display_command(), e),
            )
        })?;
        if !output.status.success() {
            return Err(CoverError::instrumentation(req.source, failure_message(&output)));
        }
        Ok(())
    }
}
