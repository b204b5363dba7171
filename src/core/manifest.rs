//! The coverage manifest: which files were instrumented under which variable.

use std::collections::{BTreeMap, HashSet};

use super::cover_mode::CoverMode;
use super::cover_var::CoverageVariable;

/// Coverage variables produced for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCoverage {
    pub import_path: String,

    /// Report name to variable, ordered by report name
    pub vars: BTreeMap<String, CoverageVariable>,
}

impl ModuleCoverage {
    pub fn new(import_path: impl Into<String>) -> Self {
        ModuleCoverage {
            import_path: import_path.into(),
            vars: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, var: CoverageVariable) {
        self.vars.insert(var.file.clone(), var);
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Every package instrumented during a run, in instrumentation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageManifest {
    pub mode: CoverMode,
    modules: Vec<ModuleCoverage>,
}

impl CoverageManifest {
    pub fn new(mode: CoverMode) -> Self {
        CoverageManifest {
            mode,
            modules: Vec::new(),
        }
    }

    pub fn push(&mut self, module: ModuleCoverage) {
        self.modules.push(module);
    }

    pub fn modules(&self) -> &[ModuleCoverage] {
        &self.modules
    }

    pub fn contains(&self, import_path: &str) -> bool {
        self.modules.iter().any(|m| m.import_path == import_path)
    }

    /// Every (module, variable) pair in manifest order.
    pub fn vars(&self) -> impl Iterator<Item = (&ModuleCoverage, &CoverageVariable)> {
        self.modules
            .iter()
            .flat_map(|m| m.vars.values().map(move |v| (m, v)))
    }

    pub fn file_count(&self) -> usize {
        self.modules.iter().map(|m| m.vars.len()).sum()
    }

    /// True when no two files share a variable and no file appears twice.
    pub fn is_bijective(&self) -> bool {
        let mut files = HashSet::new();
        let mut idents = HashSet::new();
        self.vars()
            .all(|(_, v)| files.insert(v.file.as_str()) && idents.insert(v.var.as_str()))
    }
}
