//! Test fixtures: small Go packages written to a temporary directory.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::FakeGoTool;
use crate::core::GoPackage;

/// Entry point of the demo program.
pub const DEMO_MAIN_GO: &str = r#"package main

import (
	"fmt"

	"demo/app/lib"
)

// main prints the answer.
func main() {
	defer coverReport()
	fmt.Println(lib.Answer())
}
"#;

/// The demo program's only internal package.
pub const DEMO_LIB_GO: &str = r#"package lib

// Answer returns the answer.
func Answer() int {
	return 42
}
"#;

/// A package with the given files under `root/<import_path>`. Each file
/// holds one trivial function.
pub fn package_with_files(root: &Path, import_path: &str, files: &[&str]) -> GoPackage {
    let dir = root.join(import_path);
    fs::create_dir_all(&dir).unwrap();

    let name = import_path.rsplit('/').next().unwrap_or(import_path).to_string();
    for (i, file) in files.iter().enumerate() {
        fs::write(dir.join(file), format!("package {}\n\nfunc F{}() {{}}\n", name, i)).unwrap();
    }

    GoPackage {
        dir,
        name,
        import_path: import_path.to_string(),
        go_files: files.iter().map(|f| f.to_string()).collect(),
        ..Default::default()
    }
}

/// `demo/app` (a command) importing `demo/app/lib` (one file, one
/// statement).
pub struct DemoProject {
    pub tmp: TempDir,
    pub tool: FakeGoTool,
}

impl DemoProject {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let app_dir = tmp.path().join("demo/app");
        let lib_dir = app_dir.join("lib");
        fs::create_dir_all(&lib_dir).unwrap();
        fs::write(app_dir.join("main.go"), DEMO_MAIN_GO).unwrap();
        fs::write(lib_dir.join("lib.go"), DEMO_LIB_GO).unwrap();

        let mut tool = FakeGoTool::new();
        tool.add_package(GoPackage {
            dir: app_dir,
            name: "main".to_string(),
            import_path: "demo/app".to_string(),
            go_files: vec!["main.go".to_string()],
            imports: vec!["demo/app/lib".to_string(), "fmt".to_string()],
            deps: vec![
                "demo/app/lib".to_string(),
                "errors".to_string(),
                "fmt".to_string(),
                "demo/app/vendor/golang.org/x/text".to_string(),
            ],
            ..Default::default()
        });
        tool.add_package(GoPackage {
            dir: lib_dir,
            name: "lib".to_string(),
            import_path: "demo/app/lib".to_string(),
            go_files: vec!["lib.go".to_string()],
            ..Default::default()
        });

        DemoProject { tmp, tool }
    }

    pub fn main_go(&self) -> std::path::PathBuf {
        self.tmp.path().join("demo/app/main.go")
    }

    pub fn lib_go(&self) -> std::path::PathBuf {
        self.tmp.path().join("demo/app/lib/lib.go")
    }
}

impl Default for DemoProject {
    fn default() -> Self {
        Self::new()
    }
}
