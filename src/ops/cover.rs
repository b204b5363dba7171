//! The `covharness` pipeline.
//!
//! Resolve → instrument → synthesize → merge → write. Every stage is
//! fail-fast; nothing is rolled back.

use std::fs;
use std::path::PathBuf;

use crate::core::{CoverMode, CoverageManifest};
use crate::errors::{CoverError, CoverResult};
use crate::ops::harness::synthesize_harness;
use crate::ops::instrument::{CommitMode, InstrumentContext};
use crate::ops::merge::merge_units;
use crate::ops::resolve::{resolve_all, DEFAULT_VENDOR_SEGMENT};
use crate::syntax::parse_source;
use crate::toolchain::GoTool;

/// Default prefix of generated coverage identifiers.
pub const DEFAULT_VAR_PREFIX: &str = "GoCover";

/// Default name of the entry-point file inside the entry package.
pub const DEFAULT_ENTRY_FILE: &str = "main.go";

/// Options for a coverage run.
#[derive(Debug, Clone)]
pub struct CoverOptions {
    /// Package specifiers; the first one is the entry package.
    pub modules: Vec<String>,
    pub var_prefix: String,
    pub mode: CoverMode,
    pub entry_file: String,
    pub vendor_segment: String,
    pub commit: CommitMode,
    /// Leave the entry file untouched and only return the merged source.
    pub print_only: bool,
}

impl Default for CoverOptions {
    fn default() -> Self {
        CoverOptions {
            modules: Vec::new(),
            var_prefix: DEFAULT_VAR_PREFIX.to_string(),
            mode: CoverMode::default(),
            entry_file: DEFAULT_ENTRY_FILE.to_string(),
            vendor_segment: DEFAULT_VENDOR_SEGMENT.to_string(),
            commit: CommitMode::default(),
            print_only: false,
        }
    }
}

/// Result of a successful run.
#[derive(Debug)]
pub struct CoverOutcome {
    pub manifest: CoverageManifest,
    /// Path of the entry-point file.
    pub entry_file: PathBuf,
    /// Merged source text.
    pub merged: String,
    /// Whether the entry-point file was rewritten.
    pub written: bool,
}

/// Run the whole pipeline.
pub fn run(tool: &dyn GoTool, opts: &CoverOptions) -> CoverResult<CoverOutcome> {
    let resolution = resolve_all(tool, &opts.modules, &opts.vendor_segment)?;
    let entry = &resolution.entry;

    // Parse the entry point before touching any source file.
    let entry_file = entry.dir.join(&opts.entry_file);
    let entry_source =
        fs::read_to_string(&entry_file).map_err(|e| CoverError::io(&entry_file, e))?;
    let original = parse_source(&entry_file.display().to_string(), &entry_source)?;
    if original.import_decls().next().is_none() {
        return Err(CoverError::merge("entry point has no import declaration"));
    }

    let mut ctx = InstrumentContext::new(&opts.var_prefix, opts.mode, opts.commit)?;
    for module in &resolution.modules {
        ctx.instrument_module(tool, module)?;
    }
    let manifest = ctx.finish()?;
    tracing::info!(
        "instrumented {} file(s) in {} package(s)",
        manifest.file_count(),
        manifest.modules().len()
    );

    let harness = synthesize_harness(&manifest, entry)?;
    let merged = merge_units(harness, original)?.print();

    let written = !opts.print_only;
    if written {
        fs::write(&entry_file, &merged).map_err(|e| CoverError::io(&entry_file, e))?;
        tracing::info!("wrote coverage harness into {}", entry_file.display());
    }

    Ok(CoverOutcome {
        manifest,
        entry_file,
        merged,
        written,
    })
}
