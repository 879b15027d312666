//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use crate::commands;

/// dmrfill - Fill QDMR codeplugs with repeaters from public directories
#[derive(Parser, Debug)]
#[command(name = "dmrfill")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (off, error, warn, info, debug, trace) [default: warn]
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LevelFilter>,

    /// More logging: -v for info, -vv for debug
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add zones, channels and contacts for directory repeaters to a codeplug
    Fill(commands::fill::FillArgs),

    /// Manage the directory response cache
    Cache(commands::cache::CacheArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging();

        match self.command {
            Commands::Fill(args) => commands::fill::execute(args),
            Commands::Cache(args) => commands::cache::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    /// The level set by flags, if any. `-v` wins over `--log-level`.
    fn level(&self) -> Option<LevelFilter> {
        match self.verbose {
            0 => self.log_level,
            1 => Some(LevelFilter::Info),
            _ => Some(LevelFilter::Debug),
        }
    }

    /// Logs go to stderr; stdout carries the codeplug. `RUST_LOG` applies
    /// when no flag sets a level.
    fn init_logging(&self) {
        let env = env_logger::Env::default().default_filter_or("warn");
        let mut builder = env_logger::Builder::from_env(env);
        if let Some(level) = self.level() {
            builder.filter_level(level);
        }
        builder.format_timestamp(None).target(env_logger::Target::Stderr);
        // a logger may already be installed
        let _ = builder.try_init();
    }
}
