//! Configuration management module.
//!
//! Handles manifest file loading (TOML or JSON), environment overrides,
//! validation, and default generation.

mod service;
pub mod types;
pub(crate) mod validation;

pub use types::ConfigDocument;

pub use service::{
    ConfigService, DocumentFormat, ENV_WEATHER_API_KEY, ENV_WIFI_PASSWORD, ENV_WIFI_SSID,
};
