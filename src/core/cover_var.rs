//! Coverage variables and their name generator.

/// The identifier under which one instrumented file declares its counters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoverageVariable {
    /// Report name: `<import path>/<file name>`
    pub file: String,

    /// Go identifier of the counter struct, e.g. `GoCover3`
    pub var: String,
}

impl CoverageVariable {
    pub fn new(file: impl Into<String>, var: impl Into<String>) -> Self {
        CoverageVariable {
            file: file.into(),
            var: var.into(),
        }
    }
}

/// Produces `<prefix>1`, `<prefix>2`, ... for the lifetime of one run.
#[derive(Debug, Clone)]
pub struct VarNames {
    prefix: String,
    next: u64,
}

impl VarNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        VarNames {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// Consume the next identifier.
    pub fn next_name(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        name
    }

    /// Number of identifiers handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}
