//! Test utilities for covharness unit tests.
//!
//! Provides [`FakeGoTool`], a deterministic stand-in for the Go toolchain,
//! and fixtures that lay out small Go packages on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use covharness::test_support::{package_with_files, FakeGoTool};
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let mut tool = FakeGoTool::new();
//! tool.add_package(package_with_files(tmp.path(), "demo/lib", &["lib.go"]));
//! tool.fail_on("broken.go");
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::core::GoPackage;
use crate::errors::{CoverError, CoverResult};
use crate::toolchain::{CoverRequest, GoTool};

pub use fixtures::*;

/// In-memory [`GoTool`].
///
/// `list` answers from registered packages. `cover` copies the source and
/// appends a counter struct declaration under the requested identifier.
#[derive(Debug, Default)]
pub struct FakeGoTool {
    packages: HashMap<String, GoPackage>,
    failing: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeGoTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package under its import path.
    pub fn add_package(&mut self, pkg: GoPackage) -> &mut Self {
        self.packages.insert(pkg.import_path.clone(), pkg);
        self
    }

    /// Make instrumentation of every file with this name fail.
    pub fn fail_on(&mut self, file_name: &str) -> &mut Self {
        self.failing.insert(file_name.to_string());
        self
    }

    /// Commands issued so far, e.g. `list demo/app` or
    /// `cover -mode=set -var GoCover1 lib.go`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl GoTool for FakeGoTool {
    fn list(&self, spec: &str) -> CoverResult<GoPackage> {
        self.calls.borrow_mut().push(format!("list {}", spec));
        self.packages
            .get(spec)
            .cloned()
            .ok_or_else(|| CoverError::resolution(spec, format!("cannot find package \"{}\"", spec)))
    }

    fn cover(&self, req: &CoverRequest<'_>) -> CoverResult<()> {
        let file_name = req
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.borrow_mut().push(format!(
            "cover -mode={} -var {} {}",
            req.mode, req.var, file_name
        ));

        if self.failing.contains(&file_name) {
            return Err(CoverError::instrumentation(
                req.source,
                format!("{}:1:1: expected 'package', found 'EOF'\nexit status 1", file_name),
            ));
        }

        let source = std::fs::read_to_string(req.source)
            .map_err(|e| CoverError::instrumentation(req.source, e.to_string()))?;
        std::fs::write(req.output, instrumented_source(&source, req.var))
            .map_err(|e| CoverError::io(req.output, e))
    }
}

/// What `go tool cover` would produce for a file with a single block.
pub fn instrumented_source(source: &str, var: &str) -> String {
    format!(
        "{}\nvar {} = struct {{\n\tCount   [1]uint32\n\tPos     [3 * 1]uint32\n\tNumStmt [1]uint16\n}}{{\n\tPos: [3 * 1]uint32{{\n\t\t3, 5, 0x20002,\n\t}},\n\tNumStmt: [1]uint16{{\n\t\t1,\n\t}},\n}}\n",
        source.trim_end(),
        var
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;

    #[test]
    fn test_instrumented_source_is_valid_go() {
        let text = instrumented_source("package lib\n\nfunc F() {}\n", "GoCover7");
        let unit = parse_source("lib.go", &text).unwrap();

        let names: Vec<_> = unit.source_decls().filter_map(|d| d.name.as_deref()).collect();
        assert_eq!(names, vec!["F", "GoCover7"]);
    }

    #[test]
    fn test_unknown_package() {
        let tool = FakeGoTool::new();
        assert!(tool.list("nope").is_err());
        assert_eq!(tool.calls(), vec!["list nope"]);
    }
}
