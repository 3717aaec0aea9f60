//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Configuration manifest tool for ESP e-paper weather displays
#[derive(Parser)]
#[command(
    name = "espaper-config",
    version,
    about = "Configuration manifest tool for ESP e-paper weather displays",
    long_about = "Generates, validates and prints the startup configuration of an \
                  e-paper weather display: Wi-Fi, weather provider, locale, \
                  daylight-saving rules and NTP settings."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (TOML, or JSON with a .json extension)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Write logs to daily-rotated files in this directory instead of stderr
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

/// Output format for the manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// TOML, loadable with --config
    Toml,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the effective manifest
    Show {
        /// Output format
        #[arg(long, short = 'f', default_value = "json")]
        format: Format,

        /// Print credentials instead of masking them
        #[arg(long)]
        reveal_secrets: bool,
    },
    /// Validate the manifest and report every issue
    Check,
    /// Generate default configuration file
    Init {
        /// Path where to create the configuration file
        #[arg(long, short = 'p')]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Display version information
    Version,
}
