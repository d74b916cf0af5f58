mod commands;
mod config;
mod frames;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, replay, CheckArgs, ReplayArgs};
use tracing_subscriber::EnvFilter;

/// Sprig CLI - replay virtual trees through the reconciler
#[derive(Parser, Debug)]
#[command(name = "sprig")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log reconciler decisions (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render each frame of a frames file and report the mutations
    Replay(ReplayArgs),

    /// Validate a frames file without printing output
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Replay(args) => replay(args, &cwd),
            Command::Check(args) => check(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
