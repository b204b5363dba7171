//! Instrumentation orchestration.
//!
//! Runs the instrumenter over every file of every package, naming each
//! file's counter struct with a run-wide unique identifier and recording the
//! result in the manifest.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::core::{CoverMode, CoverageManifest, CoverageVariable, GoPackage, ModuleCoverage, VarNames};
use crate::errors::{CoverError, CoverResult};
use crate::toolchain::{CoverRequest, GoTool};
use crate::util::fs::{ensure_dir, replace_file_contents};

/// When instrumented files replace the originals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitMode {
    /// Each file is overwritten as soon as it is instrumented. A failure
    /// leaves earlier files rewritten.
    #[default]
    InPlace,
    /// Every file is staged first and the originals are overwritten only
    /// after all files of all packages were instrumented.
    Staged,
}

#[derive(Debug)]
struct StagedFile {
    staged: PathBuf,
    target: PathBuf,
}

/// State of one instrumentation run: identifier counter, manifest, and
/// staged files.
#[derive(Debug)]
pub struct InstrumentContext {
    names: VarNames,
    mode: CoverMode,
    commit: CommitMode,
    manifest: CoverageManifest,
    staging: Option<TempDir>,
    pending: Vec<StagedFile>,
}

fn scratch_dir() -> CoverResult<TempDir> {
    tempfile::Builder::new()
        .prefix("covharness-")
        .tempdir()
        .map_err(|e| CoverError::io(std::env::temp_dir(), e))
}

impl InstrumentContext {
    pub fn new(var_prefix: &str, mode: CoverMode, commit: CommitMode) -> CoverResult<Self> {
        let staging = match commit {
            CommitMode::Staged => Some(scratch_dir()?),
            CommitMode::InPlace => None,
        };

        Ok(InstrumentContext {
            names: VarNames::new(var_prefix),
            mode,
            commit,
            manifest: CoverageManifest::new(mode),
            staging,
            pending: Vec::new(),
        })
    }

    pub fn manifest(&self) -> &CoverageManifest {
        &self.manifest
    }

    /// List a package and instrument all of its files.
    pub fn instrument_module(
        &mut self,
        tool: &dyn GoTool,
        import_path: &str,
    ) -> CoverResult<&ModuleCoverage> {
        let pkg = tool.list(import_path)?;
        self.instrument_package(tool, &pkg)
    }

    /// Instrument all files of an already listed package.
    pub fn instrument_package(
        &mut self,
        tool: &dyn GoTool,
        pkg: &GoPackage,
    ) -> CoverResult<&ModuleCoverage> {
        tracing::info!("instrumenting {} ({} files)", pkg.import_path, pkg.go_files.len());

        // Per-package scratch space for the in-place mode; removed on drop.
        let mut scratch = None;
        let base = match self.staging {
            Some(ref staging) => staging.path().to_path_buf(),
            None => scratch.insert(scratch_dir()?).path().to_path_buf(),
        };

        let mut coverage = ModuleCoverage::new(&pkg.import_path);
        for file in &pkg.go_files {
            let source = pkg.file_path(file);
            let var = self.names.next_name();

            let output = match self.commit {
                CommitMode::Staged => {
                    let dir = base.join(&var);
                    ensure_dir(&dir).map_err(|e| CoverError::io(&dir, e))?;
                    dir.join(file)
                }
                CommitMode::InPlace => base.join(file),
            };

            tracing::debug!("{} -> {}", source.display(), var);
            tool.cover(&CoverRequest {
                source: &source,
                output: &output,
                var: &var,
                mode: self.mode,
            })?;

            match self.commit {
                CommitMode::InPlace => {
                    replace_file_contents(&output, &source)
                        .map_err(|e| CoverError::io(&source, e))?;
                }
                CommitMode::Staged => self.pending.push(StagedFile {
                    staged: output,
                    target: source,
                }),
            }

            coverage.insert(CoverageVariable::new(pkg.report_name(file), var));
        }

        self.manifest.push(coverage);
        let modules = self.manifest.modules();
        Ok(&modules[modules.len() - 1])
    }

    /// Commit staged files and hand over the manifest.
    pub fn finish(self) -> CoverResult<CoverageManifest> {
        for file in &self.pending {
            replace_file_contents(&file.staged, &file.target)
                .map_err(|e| CoverError::io(&file.target, e))?;
        }
        if !self.pending.is_empty() {
            tracing::info!("committed {} staged file(s)", self.pending.len());
        }

        debug_assert!(self.manifest.is_bijective());
        debug_assert_eq!(self.names.issued() as usize, self.manifest.file_count());
        Ok(self.manifest)
    }
}
