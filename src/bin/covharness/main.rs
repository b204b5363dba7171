//! covharness CLI - coverage instrumentation for Go binaries

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;
mod cover;

use cli::Cli;
use covharness::errors::CoverError;
use covharness::util::diagnostic::emit;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    if cli.modules.is_empty() {
        eprintln!("{}", Cli::command().render_help());
        std::process::exit(1);
    }

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("covharness=debug")
    } else {
        EnvFilter::new("covharness=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = cover::execute(&cli) {
        match e.downcast_ref::<CoverError>() {
            Some(err) => emit(&err.to_diagnostic(), !cli.no_color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}
