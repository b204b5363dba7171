//! Go package metadata as reported by `go list -json`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A Go package: a directory of source files sharing an import path.
///
/// Field names follow the `go list -json` output. Absent lists and maps
/// decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GoPackage {
    /// Directory containing the package sources
    pub dir: PathBuf,

    /// Package name as declared in the package clause
    pub name: String,

    pub import_path: String,

    /// Non-test Go source file names, relative to `dir`
    pub go_files: Vec<String>,

    /// Direct imports
    pub imports: Vec<String>,

    /// Source import path to resolved import path (identity entries omitted)
    pub import_map: BTreeMap<String, String>,

    /// Transitive dependencies
    pub deps: Vec<String>,
}

impl GoPackage {
    /// Decode the JSON document printed by `go list -json <pkg>`.
    pub fn from_json(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(data)
    }

    /// Absolute path of one of the package's files.
    pub fn file_path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Name under which a file's blocks appear in the coverage profile.
    pub fn report_name(&self, file: &str) -> String {
        format!("{}/{}", self.import_path, file)
    }
}
