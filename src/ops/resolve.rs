//! Dependency resolution: which packages to instrument.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::core::GoPackage;
use crate::errors::{CoverError, CoverResult};
use crate::toolchain::GoTool;

/// Path segment identifying vendored code.
pub const DEFAULT_VENDOR_SEGMENT: &str = "/vendor/";

/// The package whose entry point receives the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub import_path: String,
    pub package_name: String,
    pub dir: PathBuf,
    pub imports: Vec<String>,
    pub import_map: BTreeMap<String, String>,
}

impl From<&GoPackage> for EntryPoint {
    fn from(pkg: &GoPackage) -> Self {
        EntryPoint {
            import_path: pkg.import_path.clone(),
            package_name: pkg.name.clone(),
            dir: pkg.dir.clone(),
            imports: pkg.imports.clone(),
            import_map: pkg.import_map.clone(),
        }
    }
}

/// Result of dependency resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub entry: EntryPoint,
    /// Import paths to instrument, in discovery order
    pub modules: Vec<String>,
}

/// Keep the dependencies that live under `import_path` and are not vendored.
pub fn internal_dependencies(deps: &[String], import_path: &str, vendor_segment: &str) -> Vec<String> {
    deps.iter()
        .filter(|dep| dep.contains(import_path) && !dep.contains(vendor_segment))
        .cloned()
        .collect()
}

/// Resolve the packages to instrument for one entry package.
pub fn resolve_dependencies(
    tool: &dyn GoTool,
    spec: &str,
    vendor_segment: &str,
) -> CoverResult<Resolution> {
    let pkg = tool.list(spec)?;
    if pkg.import_path.is_empty() {
        return Err(CoverError::resolution(spec, "`go list` reported no import path"));
    }

    let modules = internal_dependencies(&pkg.deps, &pkg.import_path, vendor_segment);
    tracing::debug!(
        "{}: {} of {} dependencies are internal",
        pkg.import_path,
        modules.len(),
        pkg.deps.len()
    );

    Ok(Resolution {
        entry: EntryPoint::from(&pkg),
        modules,
    })
}

/// Resolve several specifiers. The first names the entry package; every
/// further one contributes itself and its own internal dependencies.
/// Packages already listed are not added twice.
pub fn resolve_all(
    tool: &dyn GoTool,
    specs: &[String],
    vendor_segment: &str,
) -> CoverResult<Resolution> {
    let Some((entry_spec, extra)) = specs.split_first() else {
        return Err(CoverError::resolution("", "no package given"));
    };

    let mut resolution = resolve_dependencies(tool, entry_spec, vendor_segment)?;

    for spec in extra {
        let more = resolve_dependencies(tool, spec, vendor_segment)?;
        let candidates = std::iter::once(more.entry.import_path).chain(more.modules);
        for module in candidates {
            if module != resolution.entry.import_path && !resolution.modules.contains(&module) {
                resolution.modules.push(module);
            }
        }
    }

    tracing::info!(
        "resolved {} package(s) to instrument for `{}`",
        resolution.modules.len(),
        resolution.entry.import_path
    );
    Ok(resolution)
}
