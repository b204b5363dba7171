//! Top-level Go parser.
//!
//! Recognizes the package clause, import declarations and the extent of every
//! other top-level declaration. Declaration bodies are not parsed; their text
//! is kept verbatim so printing preserves them exactly.

use super::lexer::{LexError, Lexer, Token, TokenKind};
use super::unit::{Decl, DeclKeyword, ImportDecl, ImportSpec, ProgramUnit, SourceDecl};
use crate::errors::{CoverError, CoverResult};

/// Parse Go source text into a [`ProgramUnit`].
///
/// `file` is only used in error messages.
pub fn parse_source(file: &str, src: &str) -> CoverResult<ProgramUnit> {
    let tokens = Lexer::new(src).tokenize().map_err(|e| lex_error(file, e))?;
    Parser::new(file, src, tokens).parse()
}

fn lex_error(file: &str, err: LexError) -> CoverError {
    CoverError::Parse {
        file: file.to_string(),
        line: err.line,
        column: err.column,
        message: err.message,
    }
}

struct Parser<'a> {
    file: &'a str,
    src: &'a str,
    tokens: Vec<Token>,
    /// Indices of non-comment tokens.
    sig: Vec<usize>,
    pos: usize,
    /// Byte offset up to which source text has been attributed to a decl.
    consumed: usize,
}

impl<'a> Parser<'a> {
    fn new(file: &'a str, src: &'a str, tokens: Vec<Token>) -> Self {
        let sig = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind != TokenKind::Comment)
            .map(|(i, _)| i)
            .collect();
        Parser {
            file,
            src,
            tokens,
            sig,
            pos: 0,
            consumed: 0,
        }
    }

    fn parse(mut self) -> CoverResult<ProgramUnit> {
        let header_end = match self.peek() {
            Some(t) if t.is_ident(self.src, "package") => {
                self.advance();
                t.start
            }
            other => return Err(self.error(other, "expected 'package' clause")),
        };

        let package = match self.peek() {
            Some(t) if t.kind == TokenKind::Ident => {
                self.advance();
                t.text(self.src).to_string()
            }
            other => return Err(self.error(other, "expected package name")),
        };
        self.expect_semi()?;
        self.consumed = self.last_end();

        let mut unit = ProgramUnit::new(package);
        let header = &self.src[..header_end];
        if !header.trim().is_empty() {
            unit.header = header.to_string();
        }

        while let Some(t) = self.peek() {
            if t.kind == TokenKind::Semi {
                self.advance();
                continue;
            }
            if !t.is_ident(self.src, "import") {
                break;
            }
            let import = self.import_decl()?;
            unit.decls.push(Decl::Import(import));
        }

        while let Some(t) = self.peek() {
            if t.kind == TokenKind::Semi {
                self.advance();
                continue;
            }
            if t.is_ident(self.src, "import") {
                return Err(self.error(Some(t), "imports must appear before other declarations"));
            }
            let keyword = match t.kind {
                TokenKind::Ident => DeclKeyword::from_word(t.text(self.src)),
                _ => None,
            };
            let Some(keyword) = keyword else {
                return Err(self.error(
                    Some(t),
                    &format!("expected declaration, found `{}`", t.text(self.src)),
                ));
            };
            let decl = self.source_decl(keyword)?;
            unit.decls.push(Decl::Source(decl));
        }

        // Comments after the last declaration stay with it.
        let end = self.comments_end(self.tokens.len());
        if end > self.consumed {
            if let Some(Decl::Source(last)) = unit.decls.last_mut() {
                last.text.push_str(&self.src[self.consumed..end]);
                self.consumed = end;
            }
        }

        Ok(unit)
    }

    fn peek(&self) -> Option<Token> {
        self.peek_at(self.pos)
    }

    fn peek_at(&self, pos: usize) -> Option<Token> {
        self.sig.get(pos).map(|&i| self.tokens[i])
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// End offset of the last consumed significant token.
    fn last_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|p| self.peek_at(p))
            .map(|t| t.end)
            .unwrap_or(0)
    }

    fn error(&self, at: Option<Token>, message: &str) -> CoverError {
        let (line, column) = match at {
            Some(t) => (t.line, t.column),
            None => (self.src.lines().count().max(1), 1),
        };
        let message = if at.is_none() {
            format!("{} (unexpected end of file)", message)
        } else {
            message.to_string()
        };
        CoverError::Parse {
            file: self.file.to_string(),
            line,
            column,
            message,
        }
    }

    fn expect_semi(&mut self) -> CoverResult<()> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Semi => {
                self.advance();
                Ok(())
            }
            None => Ok(()),
            Some(t) => Err(self.error(
                Some(t),
                &format!("expected ';' or newline, found `{}`", t.text(self.src)),
            )),
        }
    }

    fn import_decl(&mut self) -> CoverResult<ImportDecl> {
        let keyword = self.sig[self.pos];
        let mut decl = ImportDecl {
            doc: self.doc_text(keyword),
            specs: Vec::new(),
        };
        self.advance();

        match self.peek() {
            Some(t) if t.kind == TokenKind::Open('(') => {
                self.advance();
                self.consumed = t.end;
                loop {
                    match self.peek() {
                        Some(t) if t.kind == TokenKind::Semi => self.advance(),
                        Some(t) if t.kind == TokenKind::Close(')') => {
                            // Comments left before `)` belong to the last spec.
                            let end = self.comments_end(self.sig[self.pos]);
                            if let Some(last) = decl.specs.last_mut() {
                                if end > self.consumed {
                                    let tail = &self.src[self.consumed..end];
                                    last.comment = Some(match last.comment.take() {
                                        Some(comment) => comment + tail,
                                        None => tail.to_string(),
                                    });
                                }
                            }
                            self.advance();
                            break;
                        }
                        None => return Err(self.error(None, "expected `)`")),
                        Some(_) => {
                            decl.specs.push(self.import_spec()?);
                            match self.peek() {
                                Some(t)
                                    if matches!(t.kind, TokenKind::Semi | TokenKind::Close(')')) => {}
                                other => {
                                    return Err(self.error(other, "expected ';' or `)` after import"))
                                }
                            }
                        }
                    }
                }
            }
            _ => decl.specs.push(self.import_spec()?),
        }

        self.expect_semi()?;
        self.consumed = self.last_end();
        Ok(decl)
    }

    fn import_spec(&mut self) -> CoverResult<ImportSpec> {
        let doc = self.peek().and_then(|_| self.doc_text(self.sig[self.pos]));
        let name = match self.peek() {
            Some(t) if t.kind == TokenKind::Ident => {
                self.advance();
                Some(t.text(self.src).to_string())
            }
            Some(t) if t.kind == TokenKind::Op && t.text(self.src) == "." => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };

        match self.peek() {
            Some(t) if t.kind == TokenKind::String => {
                self.advance();
                let literal = t.text(self.src);
                let path = &literal[1..literal.len() - 1];
                if path.is_empty() {
                    return Err(self.error(Some(t), "empty import path"));
                }
                let index = self.sig[self.pos - 1];
                let end = self.trailing_comment_end(index);
                let comment = (end > t.end).then(|| self.src[t.end..end].to_string());
                self.consumed = end;
                Ok(ImportSpec {
                    name,
                    path: path.to_string(),
                    doc,
                    comment,
                })
            }
            other => Err(self.error(other, "expected import path")),
        }
    }

    fn source_decl(&mut self, keyword: DeclKeyword) -> CoverResult<SourceDecl> {
        let first_pos = self.pos;
        let first = self.tokens[self.sig[first_pos]];
        self.advance();
        let name = self.decl_name(keyword);

        let mut stack: Vec<char> = Vec::new();
        let mut last_pos = first_pos;
        loop {
            let Some(t) = self.peek() else {
                if let Some(open) = stack.last() {
                    return Err(self.error(None, &format!("unclosed `{}`", open)));
                }
                break;
            };
            match t.kind {
                TokenKind::Semi if stack.is_empty() => {
                    self.advance();
                    break;
                }
                TokenKind::Open(c) => stack.push(c),
                TokenKind::Close(c) => match stack.pop() {
                    Some(open) if matching(open) == c => {}
                    Some(open) => {
                        return Err(self.error(
                            Some(t),
                            &format!("expected `{}`, found `{}`", matching(open), c),
                        ))
                    }
                    None => return Err(self.error(Some(t), &format!("unexpected `{}`", c))),
                },
                _ => {}
            }
            last_pos = self.pos;
            self.advance();
        }

        let last_index = self.sig[last_pos];
        let start = self.doc_start(self.sig[first_pos]);
        let end = self.trailing_comment_end(last_index);
        self.consumed = end;

        debug_assert!(start <= first.start);
        Ok(SourceDecl {
            keyword,
            name,
            text: self.src[start..end].to_string(),
        })
    }

    /// Name of a declaration, looked up without consuming tokens. Grouped
    /// declarations and methods have no name.
    fn decl_name(&self, keyword: DeclKeyword) -> Option<String> {
        let t = self.peek()?;
        if keyword == DeclKeyword::Func && t.kind == TokenKind::Open('(') {
            return None;
        }
        (t.kind == TokenKind::Ident).then(|| t.text(self.src).to_string())
    }

    /// Start of the comments above the token at `index` that no earlier
    /// declaration has claimed. Blank lines between them are kept.
    fn doc_start(&self, index: usize) -> usize {
        let mut start = self.tokens[index].start;
        for t in self.tokens[..index].iter().rev() {
            if t.kind != TokenKind::Comment || t.start < self.consumed {
                break;
            }
            start = t.start;
        }
        start
    }

    /// Unclaimed comment text above the token at `index`.
    fn doc_text(&self, index: usize) -> Option<String> {
        let start = self.doc_start(index);
        let doc = self.src[start..self.tokens[index].start].trim_end();
        (!doc.is_empty()).then(|| doc.to_string())
    }

    /// End of the last unclaimed comment before the token at `index`, or
    /// `consumed` when there is none.
    fn comments_end(&self, index: usize) -> usize {
        self.tokens[..index]
            .iter()
            .rev()
            .take_while(|t| t.end > self.consumed)
            .find(|t| t.kind == TokenKind::Comment)
            .map(|t| t.end)
            .unwrap_or(self.consumed)
    }

    /// End of the declaration including a comment on its last line.
    fn trailing_comment_end(&self, last_index: usize) -> usize {
        let mut end = self.tokens[last_index].end;
        for t in &self.tokens[last_index + 1..] {
            match t.kind {
                TokenKind::Comment if !self.src[end..t.start].contains('\n') => end = t.end,
                TokenKind::Comment => break,
                TokenKind::Semi if t.start == t.end => {}
                _ => break,
            }
        }
        end
    }
}

fn matching(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN_GO: &str = r#"// Command app does things.
package main

import (
	"fmt"
	str "strings" // aliased
	_ "embed"
)

import "os"

// Version is set at link time.
var Version = "dev" // trailing

type (
	point struct{ x, y int }
)

func (p point) String() string {
	return fmt.Sprintf("(%d, %d)", p.x, p.y)
}

/* main prints things.
   Multi-line doc. */
func main() {
	if len(os.Args) > 1 {
		fmt.Println(str.ToUpper("}{"))
	}
}
"#;

    #[test]
    fn test_parse_package_and_imports() {
        let unit = parse_source("main.go", MAIN_GO).unwrap();
        assert_eq!(unit.package, "main");
        assert_eq!(unit.import_decls().count(), 2);

        let mut aliased = ImportSpec::named("str", "strings");
        aliased.comment = Some(" // aliased".to_string());
        let specs: Vec<_> = unit.imports().cloned().collect();
        assert_eq!(
            specs,
            vec![
                ImportSpec::new("fmt"),
                aliased,
                ImportSpec::named("_", "embed"),
                ImportSpec::new("os"),
            ]
        );
        assert_eq!(unit.header, "// Command app does things.\n");
    }

    #[test]
    fn test_build_constraint_header_round_trips() {
        let src = "//go:build linux && amd64\n\n// Copyright 2024 The Authors.\n\n// Command app.\npackage main\n\nimport \"os\"\n\nfunc main() { os.Exit(0) }\n";
        let unit = parse_source("main.go", src).unwrap();

        assert_eq!(
            unit.header,
            "//go:build linux && amd64\n\n// Copyright 2024 The Authors.\n\n// Command app.\n"
        );
        assert_eq!(unit.print(), src);
    }

    #[test]
    fn test_cgo_preamble_stays_on_import() {
        let src = r#"package main

/*
#include <stdlib.h>
*/
import "C"

import (
	// printing
	"fmt" // stdout

	// "log"
)

func main() { fmt.Println(C.int(1)) }
"#;
        let unit = parse_source("main.go", src).unwrap();
        let decls: Vec<_> = unit.import_decls().collect();

        assert_eq!(decls[0].doc.as_deref(), Some("/*\n#include <stdlib.h>\n*/"));
        assert_eq!(decls[0].specs, vec![ImportSpec::new("C")]);

        let fmt = &decls[1].specs[0];
        assert_eq!(fmt.doc.as_deref(), Some("// printing"));
        assert_eq!(fmt.comment.as_deref(), Some(" // stdout\n\n\t// \"log\""));
        assert_eq!(decls[1].doc, None);

        let printed = unit.print();
        assert!(printed.contains("/*\n#include <stdlib.h>\n*/\nimport \"C\"\n"));
        assert!(printed.contains("\t// printing\n\t\"fmt\" // stdout\n\n\t// \"log\"\n)\n"));
        assert_eq!(parse_source("main.go", &printed).unwrap(), unit);
    }

    #[test]
    fn test_free_floating_comments_are_kept() {
        let src = "package main\n\nimport \"fmt\"\n\n// TODO later\n\n// main runs.\nfunc main() { fmt.Println() }\n\n// trailing notes\n";
        let unit = parse_source("main.go", src).unwrap();

        let main = unit.func("main").unwrap();
        assert!(main.text.starts_with("// TODO later\n\n// main runs.\nfunc main()"));
        assert!(main.text.ends_with("}\n\n// trailing notes"));
        assert_eq!(unit.print(), src);
    }

    #[test]
    fn test_parse_declarations_keep_text_and_comments() {
        let unit = parse_source("main.go", MAIN_GO).unwrap();
        let decls: Vec<_> = unit.source_decls().collect();
        assert_eq!(decls.len(), 4);

        assert_eq!(decls[0].keyword, DeclKeyword::Var);
        assert_eq!(decls[0].name.as_deref(), Some("Version"));
        assert_eq!(
            decls[0].text,
            "// Version is set at link time.\nvar Version = \"dev\" // trailing"
        );

        assert_eq!(decls[1].keyword, DeclKeyword::Type);
        assert_eq!(decls[1].name, None);

        assert_eq!(decls[2].keyword, DeclKeyword::Func);
        assert_eq!(decls[2].name, None);

        let main = unit.func("main").unwrap();
        assert!(main.text.starts_with("/* main prints things."));
        assert!(main.text.ends_with("\t}\n}"));
        assert!(main.text.contains("str.ToUpper(\"}{\")"));
    }

    #[test]
    fn test_print_then_parse_is_stable() {
        let unit = parse_source("main.go", MAIN_GO).unwrap();
        let printed = unit.print();
        let reparsed = parse_source("main.go", &printed).unwrap();

        assert_eq!(reparsed.imports().count(), 4);
        assert_eq!(
            reparsed.source_decls().collect::<Vec<_>>(),
            unit.source_decls().collect::<Vec<_>>()
        );
        assert_eq!(reparsed.print(), printed);
    }

    #[test]
    fn test_missing_package_clause() {
        let err = parse_source("main.go", "func main() {}\n").unwrap_err();
        match err {
            CoverError::Parse { line, message, .. } => {
                assert_eq!(line, 1);
                assert!(message.contains("package"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unbalanced_braces() {
        let err = parse_source("main.go", "package main\n\nfunc main() {\n").unwrap_err();
        assert!(err.to_string().contains("unclosed `{`"));

        let err = parse_source("main.go", "package main\n\nfunc main() {\n)}\n").unwrap_err();
        assert!(err.to_string().contains("main.go:4:1"));
    }

    #[test]
    fn test_import_after_declaration_is_rejected() {
        let src = "package main\n\nvar x = 1\n\nimport \"fmt\"\n";
        let err = parse_source("main.go", src).unwrap_err();
        assert!(err.to_string().contains("imports must appear before"));
    }

    #[test]
    fn test_statement_at_top_level_is_rejected() {
        let err = parse_source("gen.go", "package main\n\nx := 1\n").unwrap_err();
        assert!(err.to_string().contains("expected declaration, found `x`"));
    }

    #[test]
    fn test_unit_without_imports() {
        let unit = parse_source("a.go", "package lib\n\nconst N = 3\n").unwrap();
        assert_eq!(unit.import_decls().count(), 0);
        assert_eq!(unit.source_decls().count(), 1);
    }

    #[test]
    fn test_generic_function_name() {
        let unit = parse_source("a.go", "package lib\n\nfunc Map[T any](xs []T) []T { return xs }\n")
            .unwrap();
        assert!(unit.func("Map").is_some());
    }
}
