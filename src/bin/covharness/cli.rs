//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use covharness::core::CoverMode;

const ENV_HELP: &str = "\
Environment variables read by the instrumented program when it calls coverReport():
  COVERAGE_FILEPATH  Directory in which the coverage profile is created
  COVERAGE_FILENAME  Suffix of the profile name (coverage<SUFFIX>.out<random>)

Source files are rewritten in place. Keep them under version control.";

/// covharness - coverage instrumentation for Go binaries
///
/// Instruments every internal package of the entry package and merges a
/// coverage harness into its entry-point file.
#[derive(Parser)]
#[command(name = "covharness")]
#[command(author, version, about, long_about = None)]
#[command(after_help = ENV_HELP)]
pub struct Cli {
    /// Go packages; the first one is the entry package whose entry file receives the harness
    #[arg(value_name = "MODULE")]
    pub modules: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to the go binary
    #[arg(long, env = "COVHARNESS_GO", value_name = "PATH")]
    pub go: Option<PathBuf>,

    /// Counter mode: set, count or atomic
    #[arg(long, value_name = "MODE")]
    pub mode: Option<CoverMode>,

    /// Prefix of the generated coverage variables
    #[arg(long, value_name = "PREFIX")]
    pub var_prefix: Option<String>,

    /// Entry-point file of the entry package
    #[arg(long, value_name = "NAME")]
    pub entry_file: Option<String>,

    /// Stage all rewrites and commit them only after every file was instrumented
    #[arg(long)]
    pub transactional: bool,

    /// Print the merged entry file to stdout instead of rewriting it
    #[arg(long)]
    pub print: bool,
}
