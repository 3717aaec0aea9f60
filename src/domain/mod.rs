//! Domain layer containing the configuration record and its rules.
//!
//! This module contains:
//! - The immutable device configuration and its sections
//! - DST rules and language codes
//! - Secret wrapper and error taxonomy
//! - Logger with rotation

pub mod device;
pub mod dst;
mod error;
mod language;
pub mod logger;
mod secret;

pub use device::{DeviceConfiguration, TimeSettings, WeatherSettings, WifiSettings};
pub use dst::{DstRule, WeekOrdinal};
pub use error::{ConfigError, ConfigIssue};
pub use language::LanguageCode;
pub use secret::{Secret, SECRET_MASK};

pub(crate) use error::Issues;
