//! espaper-config: configuration manifest tool
//!
//! Generates, validates and prints the startup configuration of an ESP
//! e-paper weather display.

use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::{warn, Level};

use espaper_config::cli::{Cli, Commands};
use espaper_config::config::ConfigService;
use espaper_config::domain::{logger, DeviceConfiguration};
use espaper_config::service::ReportService;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging if requested
    if cli.debug || cli.log_dir.is_some() {
        let level = if cli.debug { Level::DEBUG } else { Level::INFO };
        logger::init(level, cli.log_dir.as_deref())?;
    }

    // Execute command
    match cli.command {
        Commands::Show {
            format,
            reveal_secrets,
        } => {
            let doc = ConfigService::load_document(cli.config.as_deref())?;
            let report = ReportService::new(format, reveal_secrets);

            // An invalid manifest is still shown so display-only use keeps working
            let output = match DeviceConfiguration::from_document(doc.clone()) {
                Ok(config) => report.render_config(&config)?,
                Err(e) => {
                    warn!("Showing unvalidated configuration: {}", e);
                    if !cli.quiet {
                        eprintln!("Configuration has {} issue(s):", e.issues().len());
                        for line in ReportService::issue_lines(&e) {
                            eprintln!("{}", line);
                        }
                    }
                    report.render_document(&doc)?
                }
            };
            println!("{}", output);
        }
        Commands::Check => {
            let doc = ConfigService::load_document(cli.config.as_deref())?;
            match DeviceConfiguration::from_document(doc) {
                Ok(config) => {
                    if !cli.quiet {
                        eprintln!("Configuration is valid.");
                        print!("{}", ReportService::summary(&config));
                    }
                }
                Err(e) => {
                    eprintln!("Configuration has {} issue(s):", e.issues().len());
                    for line in ReportService::issue_lines(&e) {
                        eprintln!("{}", line);
                    }
                    process::exit(1);
                }
            }
        }
        Commands::Init { path, force } => {
            let config_path = if let Some(p) = path {
                ConfigService::generate_at(&p, force)?;
                p
            } else {
                ConfigService::generate_default(force)?
            };
            if !cli.quiet {
                eprintln!("Configuration file created at: {}", config_path.display());
            }
        }
        Commands::Version => {
            println!("espaper-config {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
