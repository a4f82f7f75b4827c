mod commands;
mod config;
mod store;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, init, replay, visibility, CheckArgs, InitArgs, ReplayArgs, VisibilityArgs};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Customfly CLI - Check, evaluate and replay product customizer designs
#[derive(Parser, Debug)]
#[command(name = "customfly")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./customfly.config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Customfly project
    Init(InitArgs),

    /// Validate design documents
    Check(CheckArgs),

    /// Show which elements a catalog selection makes visible
    Visibility(VisibilityArgs),

    /// Apply a mutation script to a design
    Replay(ReplayArgs),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Check(args) => check(args, &cwd),
        Command::Visibility(args) => visibility(args, &cwd),
        Command::Replay(args) => {
            let config = Config::load(&cwd, cli.config.as_deref())?;
            replay(args, &config, &cwd).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
