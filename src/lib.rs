//! espaper-config: configuration manifest for ESP e-paper weather displays.
//!
//! The manifest is built once at startup from compiled-in defaults, an
//! optional TOML or JSON file and environment overrides, validated in a
//! single pass, and then handed read-only to the Wi-Fi, weather, NTP and
//! display collaborators.
//!
//! ```no_run
//! use espaper_config::config::ConfigService;
//!
//! let config = ConfigService::load(None)?;
//! println!("refresh every {}s", config.update_interval_secs());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod service;

pub use config::{ConfigDocument, ConfigService};
pub use domain::{ConfigError, ConfigIssue, DeviceConfiguration};
