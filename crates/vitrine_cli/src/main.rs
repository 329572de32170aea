//! Vitrine CLI
//!
//! Inspect and drive the theme engine and the effects controller from a
//! terminal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::budget::BudgetArgs;
use commands::simulate::SimulateArgs;
use commands::theme::ThemeAction;
use commands::watch::WatchArgs;
use config::VitrineConfig;

/// Vitrine - theme resolution and adaptive effects
#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file or directory containing vitrine.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Settings file, overriding [store].path
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default vitrine.toml
    Init {
        /// Target directory or file
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Resolve a preference without touching stored settings
    Resolve {
        /// light, dark, auto or system
        preference: String,

        /// The OS prefers a dark appearance
        #[arg(long)]
        os_dark: bool,

        /// Local hour (0-23); the current hour when omitted
        #[arg(long)]
        hour: Option<u32>,
    },

    /// Show or change stored theme settings
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// Show the effects budget for a device
    Budget(BudgetArgs),

    /// Replay synthetic frame rates through the effects controller
    Simulate(SimulateArgs),

    /// Run both engines against this host and log changes
    Watch(WatchArgs),
}

fn init_logging(config: &VitrineConfig, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(&config.log.filter)
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        // init must work before any config exists
        Commands::Init { .. } => VitrineConfig::default(),
        _ => VitrineConfig::discover(cli.config.as_deref())?,
    };
    init_logging(&config, cli.verbose);

    match &cli.command {
        Commands::Init { path, force } => {
            let written = commands::init::run(path, *force)?;
            println!("Wrote {}", written.display());
        }

        Commands::Resolve {
            preference,
            os_dark,
            hour,
        } => {
            let scheme = commands::resolve::run(&config, preference, *os_dark, *hour)?;
            println!("{scheme}");
        }

        Commands::Theme { action } => {
            commands::theme::run(&config, cli.store.as_deref(), action)?;
        }

        Commands::Budget(args) => {
            commands::budget::run(&config, args)?;
        }

        Commands::Simulate(args) => {
            commands::simulate::run(&config, args)?;
        }

        Commands::Watch(args) => {
            commands::watch::run(&config, cli.store.as_deref(), args).await?;
        }
    }

    Ok(())
}
