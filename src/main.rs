// ABOUTME: Main entry point for the revealpack program.
// ABOUTME: Provides the CLI interface and runs builds or serve mode from the library.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use revealpack::{Config, SassCommand, ServeConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project root containing config.json (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every presentation and the table of contents
    Build,

    /// Build, serve the output and rebuild on changes
    Serve(ServeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Port for the local web server
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Wait this long for changes to settle before rebuilding
    #[arg(long, default_value_t = 500)]
    debounce_ms: u64,
}

fn resolve_root(root: Option<&Path>) -> anyhow::Result<PathBuf> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    Ok(revealpack::utils::get_absolute_path(&root)?)
}

fn init_logging(config: &Config) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level()),
    )
    .try_init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let root = resolve_root(cli.root.as_deref())?;
    let config = Config::load(&root).with_context(|| format!("Failed to load configuration from {:?}", root))?;
    init_logging(&config);

    let compiler = SassCommand::from_env();
    match &cli.command {
        Some(Commands::Build) | None => {
            let report = revealpack::run_build(&root, &config, &compiler)?.into_result()?;
            println!(
                "Built {} presentation(s): {:?}",
                report.decks.len(),
                report.toc_path
            );
        }
        Some(Commands::Serve(args)) => {
            revealpack::serve(
                ServeConfig {
                    root,
                    port: args.port,
                    debounce_ms: args.debounce_ms,
                },
                &compiler,
            )?;
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
