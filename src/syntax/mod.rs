//! Go source files as program units.
//!
//! A shallow parser and printer: enough structure to merge two files at the
//! declaration level, with every declaration's text preserved verbatim.

mod lexer;
mod parser;
mod unit;

pub use parser::parse_source;
pub use unit::{Decl, DeclKeyword, ImportDecl, ImportSpec, ProgramUnit, SourceDecl};
