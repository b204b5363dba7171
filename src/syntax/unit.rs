//! In-memory program units and their printer.

use std::fmt::Write as _;

/// One Go source file: its package clause and top-level declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramUnit {
    /// Source text before the `package` keyword: build constraints, license
    /// headers and the package doc comment. Empty when there is none.
    pub header: String,
    pub package: String,
    pub decls: Vec<Decl>,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Import(ImportDecl),
    Source(SourceDecl),
}

/// An `import` declaration, grouped or single.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportDecl {
    /// Comments above the `import` keyword, such as a cgo preamble.
    pub doc: Option<String>,
    pub specs: Vec<ImportSpec>,
}

impl ImportDecl {
    /// The specs of this declaration, with the declaration's doc comment
    /// moved onto the first spec.
    ///
    /// Inside a group, cgo reads the preamble of `import "C"` from the
    /// spec's doc.
    pub fn into_specs(self) -> Vec<ImportSpec> {
        let mut specs = self.specs;
        if let (Some(doc), Some(first)) = (self.doc, specs.first_mut()) {
            first.doc = Some(match first.doc.take() {
                Some(own) => format!("{}\n{}", doc, own),
                None => doc,
            });
        }
        specs
    }
}

/// A single import: optional name (`_`, `.` or an alias) and the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: Option<String>,
    pub path: String,
    /// Comment lines directly above the spec.
    pub doc: Option<String>,
    /// Text printed right after the path: a same-line comment, plus any
    /// comments left before the closing `)` when this is a group's last spec.
    pub comment: Option<String>,
}

impl ImportSpec {
    pub fn new(path: impl Into<String>) -> Self {
        ImportSpec {
            name: None,
            path: path.into(),
            doc: None,
            comment: None,
        }
    }

    pub fn named(name: impl Into<String>, path: impl Into<String>) -> Self {
        ImportSpec {
            name: Some(name.into()),
            ..ImportSpec::new(path)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    Func,
    Var,
    Const,
    Type,
}

impl DeclKeyword {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "func" => Some(DeclKeyword::Func),
            "var" => Some(DeclKeyword::Var),
            "const" => Some(DeclKeyword::Const),
            "type" => Some(DeclKeyword::Type),
            _ => None,
        }
    }
}

/// A `func`, `var`, `const` or `type` declaration kept as source text.
///
/// `text` includes the doc comment and a trailing same-line comment. `name`
/// is `None` for grouped declarations such as `var ( ... )`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDecl {
    pub keyword: DeclKeyword,
    pub name: Option<String>,
    pub text: String,
}

impl ProgramUnit {
    pub fn new(package: impl Into<String>) -> Self {
        ProgramUnit {
            header: String::new(),
            package: package.into(),
            decls: Vec::new(),
        }
    }

    /// Import declarations in source order.
    pub fn import_decls(&self) -> impl Iterator<Item = &ImportDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Import(import) => Some(import),
            Decl::Source(_) => None,
        })
    }

    /// All import specs across every import declaration.
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.import_decls().flat_map(|d| d.specs.iter())
    }

    /// Non-import declarations in source order.
    pub fn source_decls(&self) -> impl Iterator<Item = &SourceDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Source(decl) => Some(decl),
            Decl::Import(_) => None,
        })
    }

    /// Find a function (not a method) by name.
    pub fn func(&self, name: &str) -> Option<&SourceDecl> {
        self.source_decls()
            .find(|d| d.keyword == DeclKeyword::Func && d.name.as_deref() == Some(name))
    }

    /// Print the unit back to Go source text.
    pub fn print(&self) -> String {
        let mut out = self.header.clone();
        let _ = writeln!(out, "package {}", self.package);

        for decl in &self.decls {
            out.push('\n');
            match decl {
                Decl::Import(import) => print_import(&mut out, import),
                Decl::Source(source) => {
                    out.push_str(source.text.trim_end());
                    out.push('\n');
                }
            }
        }

        out
    }
}

fn print_import(out: &mut String, import: &ImportDecl) {
    if let Some(ref doc) = import.doc {
        let _ = writeln!(out, "{}", doc);
    }

    if let [spec] = import.specs.as_slice() {
        if spec.doc.is_none() {
            let _ = writeln!(out, "import {}", spec_text(spec));
            return;
        }
    }

    out.push_str("import (\n");
    for spec in &import.specs {
        if let Some(ref doc) = spec.doc {
            let _ = writeln!(out, "\t{}", doc);
        }
        let _ = writeln!(out, "\t{}", spec_text(spec));
    }
    out.push_str(")\n");
}

fn spec_text(spec: &ImportSpec) -> String {
    let mut text = match spec.name {
        Some(ref name) => format!("{} \"{}\"", name, spec.path),
        None => format!("\"{}\"", spec.path),
    };
    if let Some(ref comment) = spec.comment {
        text.push_str(comment);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(keyword: DeclKeyword, name: &str, text: &str) -> Decl {
        Decl::Source(SourceDecl {
            keyword,
            name: Some(name.to_string()),
            text: text.to_string(),
        })
    }

    #[test]
    fn test_print_grouped_imports_and_decls() {
        let unit = ProgramUnit {
            header: String::new(),
            package: "main".to_string(),
            decls: vec![
                Decl::Import(ImportDecl {
                    doc: None,
                    specs: vec![ImportSpec::new("fmt"), ImportSpec::named("_cover0", "demo/lib")],
                }),
                decl(DeclKeyword::Func, "main", "func main() {\n\tfmt.Println(\"hi\")\n}\n\n"),
            ],
        };

        assert_eq!(
            unit.print(),
            "package main\n\nimport (\n\t\"fmt\"\n\t_cover0 \"demo/lib\"\n)\n\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n"
        );
    }

    #[test]
    fn test_print_single_import_without_parens() {
        let mut unit = ProgramUnit::new("main");
        unit.decls.push(Decl::Import(ImportDecl {
            doc: None,
            specs: vec![ImportSpec::new("os")],
        }));

        assert_eq!(unit.print(), "package main\n\nimport \"os\"\n");
    }

    #[test]
    fn test_print_header_and_import_comments() {
        let mut unit = ProgramUnit::new("main");
        unit.header = "//go:build linux\n\n// Command app.\n".to_string();
        let mut fmt = ImportSpec::new("fmt");
        fmt.comment = Some(" // printing".to_string());
        unit.decls.push(Decl::Import(ImportDecl {
            doc: None,
            specs: vec![fmt, ImportSpec::new("os")],
        }));

        assert_eq!(
            unit.print(),
            "//go:build linux\n\n// Command app.\npackage main\n\nimport (\n\t\"fmt\" // printing\n\t\"os\"\n)\n"
        );
    }

    #[test]
    fn test_single_spec_with_doc_is_grouped() {
        let mut unit = ProgramUnit::new("main");
        let mut c = ImportSpec::new("C");
        c.doc = Some("// #include <stdio.h>".to_string());
        unit.decls.push(Decl::Import(ImportDecl {
            doc: None,
            specs: vec![c],
        }));

        assert_eq!(
            unit.print(),
            "package main\n\nimport (\n\t// #include <stdio.h>\n\t\"C\"\n)\n"
        );
    }

    #[test]
    fn test_into_specs_moves_decl_doc_to_first_spec() {
        let decl = ImportDecl {
            doc: Some("/*\n#include <stdlib.h>\n*/".to_string()),
            specs: vec![ImportSpec::new("C")],
        };

        let specs = decl.into_specs();
        assert_eq!(specs[0].doc.as_deref(), Some("/*\n#include <stdlib.h>\n*/"));

        let mut documented = ImportSpec::new("fmt");
        documented.doc = Some("// own".to_string());
        let decl = ImportDecl {
            doc: Some("// group".to_string()),
            specs: vec![documented, ImportSpec::new("os")],
        };
        let specs = decl.into_specs();
        assert_eq!(specs[0].doc.as_deref(), Some("// group\n// own"));
        assert_eq!(specs[1].doc, None);
    }

    #[test]
    fn test_func_lookup_ignores_other_keywords() {
        let mut unit = ProgramUnit::new("main");
        unit.decls.push(decl(DeclKeyword::Var, "main", "var main = 1"));
        assert!(unit.func("main").is_none());

        unit.decls.push(decl(DeclKeyword::Func, "main", "func main() {}"));
        assert_eq!(unit.func("main").map(|d| d.text.as_str()), Some("func main() {}"));
    }
}
