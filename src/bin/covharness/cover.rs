//! The coverage command

use anyhow::Result;

use crate::cli::Cli;
use covharness::ops::cover::run;
use covharness::ops::instrument::CommitMode;
use covharness::toolchain::GoToolchain;
use covharness::util::config::validate_var_prefix;
use covharness::util::GlobalContext;

pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = GlobalContext::new()?;

    // Load configuration (global + project); CLI overrides both
    let config = ctx.load_config();
    let mut opts = config.cover_options();
    opts.modules = cli.modules.clone();

    if let Some(mode) = cli.mode {
        opts.mode = mode;
    }
    if let Some(ref prefix) = cli.var_prefix {
        opts.var_prefix = prefix.clone();
    }
    if let Some(ref entry_file) = cli.entry_file {
        opts.entry_file = entry_file.clone();
    }
    if cli.transactional {
        opts.commit = CommitMode::Staged;
    }
    opts.print_only = cli.print;

    validate_var_prefix(&opts.var_prefix)?;

    let go = cli.go.as_deref().or(config.toolchain.go.as_deref());
    let tool = GoToolchain::detect(go);

    let outcome = run(&tool, &opts)?;

    if outcome.written {
        eprintln!(
            "Instrumented {} file(s); harness written to {}",
            outcome.manifest.file_count(),
            outcome.entry_file.display()
        );
    } else {
        print!("{}", outcome.merged);
    }

    Ok(())
}
