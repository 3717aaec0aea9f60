//! Configuration service for loading and generating manifest files.

use anyhow::{bail, Context, Result};
use std::env::{self, VarError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::types::ConfigDocument;
use crate::domain::DeviceConfiguration;

/// Overrides `wifi.ssid`.
pub const ENV_WIFI_SSID: &str = "ESPAPER_WIFI_SSID";
/// Overrides `wifi.password`.
pub const ENV_WIFI_PASSWORD: &str = "ESPAPER_WIFI_PASSWORD";
/// Overrides `weather.apiKey`.
pub const ENV_WEATHER_API_KEY: &str = "ESPAPER_WEATHER_API_KEY";

/// On-disk layout of a manifest file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
}

impl DocumentFormat {
    /// `.json` files are JSON, everything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Configuration service.
pub struct ConfigService;

impl ConfigService {
    /// Get the default configuration file path: ~/.config/espaper/config.toml
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("espaper")
            .join("config.toml")
    }

    /// Load, override from the environment, convert and validate.
    ///
    /// If `path` is `None`, uses the default path, falling back to the
    /// compiled-in defaults when that file does not exist. An explicit path
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<DeviceConfiguration> {
        let (doc, source) = Self::load_document_from(path)?;

        let config = DeviceConfiguration::from_document(doc)
            .with_context(|| format!("Invalid configuration in {}", source))?;

        info!(
            "Configuration loaded from {}: city={}, interval={}s",
            source,
            config.weather().city_name(),
            config.update_interval_secs()
        );
        Ok(config)
    }

    /// Load the document with environment overrides applied, without
    /// converting it. Used to report on manifests that do not validate.
    pub fn load_document(path: Option<&Path>) -> Result<ConfigDocument> {
        Self::load_document_from(path).map(|(doc, _)| doc)
    }

    fn load_document_from(path: Option<&Path>) -> Result<(ConfigDocument, String)> {
        let (mut doc, source) = match path {
            Some(p) => {
                if !p.exists() {
                    bail!("Config file not found: {}", p.display());
                }
                (Self::read_document(p)?, p.display().to_string())
            }
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    let doc = Self::read_document(&default_path)?;
                    (doc, default_path.display().to_string())
                } else {
                    debug!(
                        "No config file at {}, using compiled-in defaults",
                        default_path.display()
                    );
                    (ConfigDocument::default(), "compiled-in defaults".to_string())
                }
            }
        };

        Self::apply_env_overrides(&mut doc);
        Ok((doc, source))
    }

    /// Read and parse a manifest file.
    pub fn read_document(path: &Path) -> Result<ConfigDocument> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse_document(&content, DocumentFormat::from_path(path))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse_document(content: &str, format: DocumentFormat) -> Result<ConfigDocument> {
        let doc = match format {
            DocumentFormat::Toml => toml::from_str(content)?,
            DocumentFormat::Json => serde_json::from_str(content)?,
        };
        Ok(doc)
    }

    /// Apply credential overrides from the process environment.
    pub fn apply_env_overrides(doc: &mut ConfigDocument) {
        Self::apply_overrides_with(doc, env_lookup);
    }

    /// Apply credential overrides from `lookup`. A variable that is set
    /// replaces the file value, even when empty.
    pub fn apply_overrides_with<F>(doc: &mut ConfigDocument, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&str, &mut String); 3] = [
            (ENV_WIFI_SSID, &mut doc.wifi.ssid),
            (ENV_WIFI_PASSWORD, &mut doc.wifi.password),
            (ENV_WEATHER_API_KEY, &mut doc.weather.api_key),
        ];

        for (name, target) in targets {
            if let Some(value) = lookup(name) {
                // Never log the value itself
                debug!("Using {} from environment", name);
                *target = value;
            }
        }
    }

    /// Generate default configuration file at the default path.
    pub fn generate_default(force: bool) -> Result<PathBuf> {
        let path = Self::default_path();
        Self::generate_at(&path, force)?;
        Ok(path)
    }

    /// Generate default configuration file at the specified path.
    pub fn generate_at(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            );
        }

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = Self::default_config_content();
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!("Default configuration written to {}", path.display());
        Ok(())
    }

    /// Generate default configuration content with comments.
    pub fn default_config_content() -> String {
        r#"# espaper-config manifest
# Every key is optional; missing keys use the compiled-in defaults.

# Access point name opened in setup mode
configPortalSsid = "ESPaperConfig"

# Weather refresh cadence in seconds (30 minutes)
updateIntervalSeconds = 1800

[wifi]
# Home network. Prefer ESPAPER_WIFI_SSID / ESPAPER_WIFI_PASSWORD over
# writing credentials here.
ssid = ""
password = ""
# Allow an empty ssid when the setup portal supplies it at runtime
portalFallback = true

[weather]
# Set to false to run without weather data (no apiKey required)
enabled = true
cityName = "Genova"
# Provider key. Prefer ESPAPER_WEATHER_API_KEY over writing it here.
apiKey = ""
# Search https://openweathermap.org/find?q= and use the number at the end
# of the city URL, e.g. https://openweathermap.org/city/2657896
locationId = "6542282"
# ar bg ca cz de el en fa fi fr gl hr hu it ja kr la lt mk nl pl pt ro ru
# se sk sl es tr ua vi zh_cn zh_tw
languageCode = "it"
# Metric (true) or imperial (false) units
metric = true
# Number of forecast entries to request (1..=40)
maxForecasts = 4

[time]
# Standard offset before daylight saving, in hours
utcOffsetHours = 1
# Tried in order until one answers
ntpServers = ["0.it.pool.ntp.org", "time.nist.gov", "pool.ntp.org"]
# Sync results before this unix time are rejected (2018-08-01)
ntpMinValidEpoch = 1533081600
ntpSyncTimeoutSeconds = 10

# Central European Summer Time = UTC+2
[time.dstStart]
label = "CEST"
weekOrdinal = "last"
weekday = "Sun"
month = "Mar"
hour = 2
offsetSeconds = 3600

# Central European Time = UTC+1
[time.dstEnd]
label = "CET"
weekOrdinal = "last"
weekday = "Sun"
month = "Oct"
hour = 2
offsetSeconds = 0
"#
        .to_string()
    }
}

/// Read `name` from the environment. A value that is not valid UTF-8 is
/// ignored with a warning.
fn env_lookup(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(_)) => {
            warn!("Ignoring {}: value is not valid UTF-8", name);
            None
        }
    }
}
