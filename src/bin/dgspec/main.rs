//! dgspec CLI - dependency graph restore specifications

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dgspec::util::diagnostic::emit;
use dgspec::BuildError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<BuildError>() {
            Some(build_error) => emit(&build_error.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("dgspec=debug")
    } else {
        EnvFilter::new("dgspec=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build(args) => commands::build::execute(args),
        Commands::Normalize(args) => commands::normalize::execute(args),
        Commands::Closure(args) => commands::query::closure(args),
        Commands::Parents(args) => commands::query::parents(args),
        Commands::Roots(args) => commands::query::roots(args),
        Commands::Hash(args) => commands::query::hash(args),
        Commands::Sort(args) => commands::query::sort(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
