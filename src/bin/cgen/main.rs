//! cgen CLI.

use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("cgen=trace")
    } else {
        EnvFilter::new("cgen=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_file(cli.verbose)
        .with_line_number(cli.verbose)
        .with_ansi(use_colors())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("cgen {}", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let root = std::env::current_dir()?;

    if cli.update {
        cgen::ops::update(&root, &cli.packages)
    } else if cli.generate {
        cgen::ops::generate(&root)
    } else {
        tracing::error!("please specify command");
        Cli::command().print_help()?;
        Ok(false)
    }
}

fn use_colors() -> bool {
    // respect the NO_COLOR environment variable, see https://no-color.org
    std::env::var_os("NO_COLOR")
        .map(|value| value.is_empty())
        .unwrap_or(true)
}
