//! Interchange document types.
//!
//! The same camelCase layout is read from TOML and JSON files and written by
//! `show`. Every key is optional; missing keys take the compiled-in defaults.
//! Values are kept loosely typed here (strings for enumerations, `i64` for
//! numbers) so that bad input is reported by validation with the field name
//! instead of failing deserialization.

use serde::{Deserialize, Serialize};

use crate::domain::DeviceConfiguration;

/// Top-level manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigDocument {
    /// Access point name used in setup mode
    pub config_portal_ssid: String,

    /// Weather refresh cadence in seconds
    pub update_interval_seconds: i64,

    pub wifi: WifiDocument,

    pub weather: WeatherDocument,

    pub time: TimeDocument,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        DeviceConfiguration::load().to_document(true)
    }
}

/// `[wifi]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WifiDocument {
    pub ssid: String,

    pub password: String,

    /// Allow an empty SSID when the setup portal provides it at runtime
    pub portal_fallback: bool,
}

impl Default for WifiDocument {
    fn default() -> Self {
        ConfigDocument::default().wifi
    }
}

/// `[weather]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeatherDocument {
    /// When false the API key and location id are not required
    pub enabled: bool,

    pub city_name: String,

    pub api_key: String,

    /// Provider city id, e.g. the number at the end of an openweathermap.org/city URL
    pub location_id: String,

    pub language_code: String,

    pub metric: bool,

    pub max_forecasts: i64,
}

impl Default for WeatherDocument {
    fn default() -> Self {
        ConfigDocument::default().weather
    }
}

/// `[time]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeDocument {
    pub utc_offset_hours: i64,

    pub ntp_servers: Vec<String>,

    pub ntp_min_valid_epoch: i64,

    pub ntp_sync_timeout_seconds: i64,

    pub dst_start: DstRuleDocument,

    pub dst_end: DstRuleDocument,
}

impl Default for TimeDocument {
    fn default() -> Self {
        ConfigDocument::default().time
    }
}

/// A DST rule. All keys are required once the table is present.
///
/// ```toml
/// [time.dstStart]
/// label = "CEST"
/// weekOrdinal = "last"
/// weekday = "Sun"
/// month = "Mar"
/// hour = 2
/// offsetSeconds = 3600
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DstRuleDocument {
    pub label: String,

    pub week_ordinal: String,

    pub weekday: String,

    pub month: String,

    pub hour: i64,

    pub offset_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let doc: ConfigDocument = toml::from_str("").unwrap();
        assert_eq!(doc, ConfigDocument::default());
        assert_eq!(doc.update_interval_seconds, 1800);
        assert_eq!(doc.time.dst_start.label, "CEST");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let doc: ConfigDocument = toml::from_str(
            r#"
            [weather]
            languageCode = "en"
            "#,
        )
        .unwrap();
        assert_eq!(doc.weather.language_code, "en");
        assert_eq!(doc.weather.city_name, "Genova");
        assert_eq!(doc.weather.max_forecasts, 4);
    }

    #[test]
    fn test_dst_rule_requires_all_keys() {
        let result: Result<ConfigDocument, _> = toml::from_str(
            r#"
            [time.dstStart]
            label = "CEST"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_json_layout_is_camel_case() {
        let json = serde_json::to_value(ConfigDocument::default()).unwrap();
        assert_eq!(json["configPortalSsid"], "ESPaperConfig");
        assert_eq!(json["weather"]["locationId"], "6542282");
        assert_eq!(json["time"]["ntpSyncTimeoutSeconds"], 10);
        assert_eq!(json["time"]["dstEnd"]["weekOrdinal"], "last");
    }
}
