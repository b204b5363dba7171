//! Tree merge of the generated harness and the original entry point.
//!
//! The merge is purely structural. Duplicate imports and colliding
//! top-level names pass through untouched and surface later as compiler
//! errors.

use crate::errors::{CoverError, CoverResult};
use crate::syntax::{Decl, ProgramUnit};

/// Merge `original` into `harness`.
///
/// All of the original's import specs are appended to the harness's first
/// import declaration, and the original's other declarations follow the
/// harness's declarations in their original order. The merged unit carries
/// the original's header, so build constraints and the package doc survive.
/// Comments on the original's import declarations move onto their specs.
pub fn merge_units(harness: ProgramUnit, original: ProgramUnit) -> CoverResult<ProgramUnit> {
    if harness.package != original.package {
        return Err(CoverError::merge(format!(
            "harness is package `{}` but the entry point is package `{}`",
            harness.package, original.package
        )));
    }

    let anchor = harness
        .decls
        .iter()
        .position(|d| matches!(d, Decl::Import(_)))
        .ok_or_else(|| CoverError::merge("generated harness has no import declaration"))?;
    if original.import_decls().next().is_none() {
        return Err(CoverError::merge("entry point has no import declaration"));
    }

    let mut merged = harness;
    merged.header = original.header;
    let mut specs = Vec::new();
    let mut rest = Vec::with_capacity(original.decls.len());
    for decl in original.decls {
        match decl {
            Decl::Import(import) => specs.extend(import.into_specs()),
            source @ Decl::Source(_) => rest.push(source),
        }
    }

    if let Decl::Import(ref mut import) = merged.decls[anchor] {
        import.specs.extend(specs);
    }
    merged.decls.extend(rest);

    tracing::debug!(
        "merged unit: {} imports, {} declarations",
        merged.imports().count(),
        merged.source_decls().count()
    );
    Ok(merged)
}
