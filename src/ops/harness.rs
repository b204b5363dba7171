//! Harness synthesis.
//!
//! Renders the Go source of a coverage harness: it links every instrumented
//! package, registers their counter structs at init time, and provides
//! `coverReport()` to write the coverage profile. Rendering is a pure
//! function of the manifest and the entry point.

use crate::core::{CoverMode, CoverageManifest};
use crate::errors::CoverResult;
use crate::ops::resolve::EntryPoint;
use crate::report::{BLOCK_LINE_FORMAT, FILENAME_ENV, FILEPATH_ENV, NO_STATEMENTS_LINE, SUMMARY_FORMAT};
use crate::syntax::{parse_source, ProgramUnit};

/// File name used for the generated source in parse errors.
pub const HARNESS_FILE: &str = "<coverage harness>";

const TEMPLATE: &str = r#"// Code generated by covharness for {{origin}}. DO NOT EDIT.

package {{package}}

import (
{{imports}})

type coverBlock struct {
	Line0 uint32
	Col0  uint16
	Line1 uint32
	Col1  uint16
	Stmts uint16
}

var (
	coverCounters = make(map[string][]uint32)
	coverBlocks   = make(map[string][]coverBlock)
)

func init() {
{{registrations}}}

func coverRegisterFile(fileName string, counter []uint32, pos []uint32, numStmts []uint16) {
	if 3*len(counter) != len(pos) || len(counter) != len(numStmts) {
		panic("coverage: mismatched sizes")
	}
	if coverCounters[fileName] != nil {
		// Already registered.
		return
	}
	coverCounters[fileName] = counter
	block := make([]coverBlock, len(counter))
	for i := range counter {
		block[i] = coverBlock{
			Line0: pos[3*i+0],
			Col0:  uint16(pos[3*i+2]),
			Line1: pos[3*i+1],
			Col1:  uint16(pos[3*i+2] >> 16),
			Stmts: numStmts[i],
		}
	}
	coverBlocks[fileName] = block
}

func coverReport() {
	reportFile, err := _covos.CreateTemp(_covos.Getenv({{filepath_env}}), "coverage"+_covos.Getenv({{filename_env}})+".out")
	if err != nil {
		_covfmt.Fprintf(_covos.Stderr, "coverage: cannot create the report file: %v\n", err)
		return
	}
	defer reportFile.Close()

	names := make([]string, 0, len(coverCounters))
	for name := range coverCounters {
		names = append(names, name)
	}
	_covsort.Strings(names)

	var active, total int64
	for _, name := range names {
		counts := coverCounters[name]
		blocks := coverBlocks[name]
		for i := range counts {
			stmts := int64(blocks[i].Stmts)
			count := {{load_count}}
			total += stmts
			if count > 0 {
				active += stmts
			}
			_covfmt.Fprintf(reportFile, {{block_format}}, name,
				blocks[i].Line0, blocks[i].Col0,
				blocks[i].Line1, blocks[i].Col1,
				stmts,
				count)
		}
	}
	if total == 0 {
		_covfmt.Fprintln(reportFile, {{no_statements}})
	} else {
		_covfmt.Fprintf(reportFile, {{summary_format}}, 100*float64(active)/float64(total))
	}
	_covfmt.Fprintf(_covos.Stderr, "Wrote coverage to the file: %s\n", reportFile.Name())
}
"#;

/// Quote a string as a Go interpreted string literal.
fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Import alias of the `index`-th instrumented package.
fn cover_alias(index: usize) -> String {
    format!("_cover{}", index)
}

fn render_imports(manifest: &CoverageManifest) -> String {
    let mut imports = vec![
        ("_covfmt".to_string(), "fmt"),
        ("_covos".to_string(), "os"),
        ("_covsort".to_string(), "sort"),
    ];
    if manifest.mode == CoverMode::Atomic {
        imports.push(("_covatomic".to_string(), "sync/atomic"));
    }
    for (i, module) in manifest.modules().iter().enumerate() {
        // Packages without instrumented files are still linked in, but a
        // named import would be unused.
        let alias = if module.is_empty() {
            "_".to_string()
        } else {
            cover_alias(i)
        };
        imports.push((alias, module.import_path.as_str()));
    }

    imports
        .iter()
        .map(|(alias, path)| format!("\t{} {}\n", alias, go_quote(path)))
        .collect()
}

fn render_registrations(manifest: &CoverageManifest) -> String {
    let mut out = String::new();
    for (i, module) in manifest.modules().iter().enumerate() {
        let alias = cover_alias(i);
        for cover in module.vars.values() {
            let var = format!("{}.{}", alias, cover.var);
            out.push_str(&format!(
                "\tcoverRegisterFile({}, {var}.Count[:], {var}.Pos[:], {var}.NumStmt[:])\n",
                go_quote(&cover.file),
            ));
        }
    }
    out
}

/// Render the harness source text.
pub fn render_harness(manifest: &CoverageManifest, entry: &EntryPoint) -> String {
    let load_count = match manifest.mode {
        CoverMode::Atomic => "_covatomic.LoadUint32(&counts[i])",
        CoverMode::Set | CoverMode::Count => "counts[i]",
    };
    let package = if entry.package_name.is_empty() {
        "main"
    } else {
        entry.package_name.as_str()
    };

    TEMPLATE
        .replace("{{origin}}", &entry.import_path)
        .replace("{{package}}", package)
        .replace("{{imports}}", &render_imports(manifest))
        .replace("{{registrations}}", &render_registrations(manifest))
        .replace("{{filepath_env}}", &go_quote(FILEPATH_ENV))
        .replace("{{filename_env}}", &go_quote(FILENAME_ENV))
        .replace("{{load_count}}", load_count)
        .replace("{{block_format}}", &go_quote(BLOCK_LINE_FORMAT))
        .replace("{{no_statements}}", &go_quote(NO_STATEMENTS_LINE))
        .replace("{{summary_format}}", &go_quote(SUMMARY_FORMAT))
}

/// Render the harness and parse it into a program unit.
pub fn synthesize_harness(manifest: &CoverageManifest, entry: &EntryPoint) -> CoverResult<ProgramUnit> {
    let source = render_harness(manifest, entry);
    tracing::debug!(
        "generated harness: {} bytes, {} registrations",
        source.len(),
        manifest.file_count()
    );
    parse_source(HARNESS_FILE, &source)
}
