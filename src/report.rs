//! Line formats and environment variables of the coverage profile.
//!
//! The generated harness writes the profile in Go at the instrumented
//! program's run time; these strings are substituted into its template.

/// Go `fmt` format of one block line.
pub const BLOCK_LINE_FORMAT: &str = "%s:%d.%d,%d.%d %d %d\n";

/// Go `fmt` format of the summary line.
pub const SUMMARY_FORMAT: &str = "coverage: %.1f%% of statements\n";

/// Summary line when no statement was instrumented.
pub const NO_STATEMENTS_LINE: &str = "coverage: [no statements]";

/// Environment variable holding the report file name suffix.
pub const FILENAME_ENV: &str = "COVERAGE_FILENAME";

/// Environment variable holding the report directory.
pub const FILEPATH_ENV: &str = "COVERAGE_FILEPATH";
