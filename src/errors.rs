//! Error types for the coverage pipeline.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Result alias used by the pipeline stages.
pub type CoverResult<T> = std::result::Result<T, CoverError>;

/// Error raised by any stage of the coverage pipeline.
///
/// Every variant is fatal: the pipeline stops at the first error and does not
/// roll back source files that were already instrumented.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum CoverError {
    #[error("failed to resolve `{module}`: {message}")]
    #[diagnostic(
        code(covharness::resolve),
        help("Check that the package builds and that `go list -json` works for it")
    )]
    Resolution { module: String, message: String },

    #[error("failed to parse {file}:{line}:{column}: {message}")]
    #[diagnostic(code(covharness::parse))]
    Parse {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to instrument `{}`: {message}", file.display())]
    #[diagnostic(
        code(covharness::instrument),
        help("Files instrumented before this one have already been rewritten")
    )]
    Instrumentation { file: PathBuf, message: String },

    #[error("failed to merge the harness with the entry point: {message}")]
    #[diagnostic(code(covharness::merge))]
    Merge { message: String },

    #[error("i/o error on `{}`: {source}", path.display())]
    #[diagnostic(code(covharness::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoverError {
    pub fn resolution(module: impl Into<String>, message: impl Into<String>) -> Self {
        CoverError::Resolution {
            module: module.into(),
            message: message.into(),
        }
    }

    pub fn instrumentation(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CoverError::Instrumentation {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn merge(message: impl Into<String>) -> Self {
        CoverError::Merge {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoverError::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert to a user-facing diagnostic with suggestions.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CoverError::Resolution { module, message } => {
                Diagnostic::error(format!("could not list package `{}`", module))
                    .with_context(message.clone())
                    .with_suggestion(format!("Run `go list -json {}` to see the failure", module))
            }

            CoverError::Parse {
                file,
                line,
                column,
                message,
            } => Diagnostic::error(format!("syntax error at {}:{}", line, column))
                .with_location(file)
                .with_context(message.clone()),

            CoverError::Instrumentation { file, message } => {
                Diagnostic::error("`go tool cover` failed")
                    .with_location(file)
                    .with_context(message.clone())
                    .with_suggestion(
                        "Restore the partially instrumented sources from version control",
                    )
                    .with_suggestion("Re-run with --transactional to stage all rewrites first")
            }

            CoverError::Merge { message } => {
                Diagnostic::error("could not merge the generated harness").with_context(message.clone())
            }

            CoverError::Io { path, source } => Diagnostic::error(source.to_string())
                .with_location(path)
                .with_suggestion("Check the file permissions"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrumentation_diagnostic() {
        let err = CoverError::instrumentation("/src/demo/lib.go", "exit status 1");
        let output = err.to_diagnostic().format(false);

        assert!(output.contains("go tool cover"));
        assert!(output.contains("/src/demo/lib.go"));
        assert!(output.contains("exit status 1"));
        assert!(output.contains("--transactional"));
    }

    #[test]
    fn test_error_messages_name_the_culprit() {
        let err = CoverError::resolution("demo/app", "exit status 1");
        assert_eq!(
            err.to_string(),
            "failed to resolve `demo/app`: exit status 1"
        );

        let err = CoverError::Parse {
            file: "main.go".to_string(),
            line: 3,
            column: 7,
            message: "unterminated string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse main.go:3:7: unterminated string"
        );
    }
}
