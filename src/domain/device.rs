//! The device configuration record.

use std::num::{NonZeroU32, NonZeroU8};

use regex::Regex;
use time::{Month, UtcOffset, Weekday};

use crate::config::types::{
    ConfigDocument, DstRuleDocument, TimeDocument, WeatherDocument, WifiDocument,
};
use crate::domain::dst::{self, DstRule, WeekOrdinal};
use crate::domain::error::{ConfigError, ConfigIssue, Issues};
use crate::domain::language::LanguageCode;
use crate::domain::secret::Secret;

/// Compiled-in defaults, used when neither the file nor the environment
/// supplies a value. No credential has a default.
pub mod defaults {
    pub const CONFIG_PORTAL_SSID: &str = "ESPaperConfig";
    pub const UPDATE_INTERVAL_SECS: u32 = 30 * 60;
    pub const CITY_NAME: &str = "Genova";
    pub const LOCATION_ID: &str = "6542282";
    pub const MAX_FORECASTS: u8 = 4;
    pub const UTC_OFFSET_HOURS: i8 = 1;
    pub const NTP_SERVERS: [&str; 3] = ["0.it.pool.ntp.org", "time.nist.gov", "pool.ntp.org"];
    /// August 1st, 2018
    pub const NTP_MIN_VALID_EPOCH: i64 = 1_533_081_600;
    pub const NTP_SYNC_TIMEOUT_SECS: u32 = 10;
}

/// Upper bound on forecast entries (provider's 5-day / 3-hour limit).
pub const MAX_FORECAST_LIMIT: u8 = 40;
/// 802.11 SSID length limit in bytes.
pub const MAX_SSID_LEN: usize = 32;
/// WPA2 passphrase bounds in bytes.
pub const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 8..=63;

const DEFAULT_UPDATE_INTERVAL: NonZeroU32 = non_zero_u32(defaults::UPDATE_INTERVAL_SECS);
const DEFAULT_NTP_SYNC_TIMEOUT: NonZeroU32 = non_zero_u32(defaults::NTP_SYNC_TIMEOUT_SECS);
const DEFAULT_MAX_FORECASTS: NonZeroU8 = match NonZeroU8::new(defaults::MAX_FORECASTS) {
    Some(v) => v,
    None => panic!("default forecast count must be non-zero"),
};

const fn non_zero_u32(value: u32) -> NonZeroU32 {
    match NonZeroU32::new(value) {
        Some(v) => v,
        None => panic!("default interval must be non-zero"),
    }
}

const HOSTNAME_PATTERN: &str =
    r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$";

/// Home network credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiSettings {
    pub(crate) ssid: String,
    pub(crate) password: Secret,
    pub(crate) portal_fallback: bool,
}

impl WifiSettings {
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &Secret {
        &self.password
    }

    /// Whether an empty SSID is acceptable because the setup portal supplies it.
    pub fn portal_fallback(&self) -> bool {
        self.portal_fallback
    }
}

/// Weather provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherSettings {
    pub(crate) enabled: bool,
    pub(crate) city_name: String,
    pub(crate) api_key: Secret,
    pub(crate) location_id: String,
    pub(crate) language: LanguageCode,
    pub(crate) metric: bool,
    pub(crate) max_forecasts: NonZeroU8,
}

impl WeatherSettings {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Label shown on the display.
    pub fn city_name(&self) -> &str {
        &self.city_name
    }

    pub fn api_key(&self) -> &Secret {
        &self.api_key
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    pub fn language(&self) -> LanguageCode {
        self.language
    }

    pub fn metric(&self) -> bool {
        self.metric
    }

    pub fn max_forecasts(&self) -> u8 {
        self.max_forecasts.get()
    }
}

/// Clock settings: base offset, DST rules and NTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSettings {
    pub(crate) utc_offset_hours: i8,
    pub(crate) dst_start: DstRule,
    pub(crate) dst_end: DstRule,
    pub(crate) ntp_servers: Vec<String>,
    pub(crate) ntp_min_valid_epoch: i64,
    pub(crate) ntp_sync_timeout: NonZeroU32,
}

impl TimeSettings {
    pub fn utc_offset_hours(&self) -> i8 {
        self.utc_offset_hours
    }

    pub fn dst_start(&self) -> &DstRule {
        &self.dst_start
    }

    pub fn dst_end(&self) -> &DstRule {
        &self.dst_end
    }

    /// Servers in the order they should be tried.
    pub fn ntp_servers(&self) -> &[String] {
        &self.ntp_servers
    }

    pub fn ntp_min_valid_epoch(&self) -> i64 {
        self.ntp_min_valid_epoch
    }

    pub fn ntp_sync_timeout_secs(&self) -> u32 {
        self.ntp_sync_timeout.get()
    }

    /// A sync result is usable only from the minimum valid epoch onwards.
    pub fn accepts_epoch(&self, epoch: i64) -> bool {
        epoch >= self.ntp_min_valid_epoch
    }

    /// Offset outside the DST period.
    pub fn standard_offset(&self) -> Option<UtcOffset> {
        UtcOffset::from_whole_seconds(i32::from(self.utc_offset_hours) * 3600).ok()
    }
}

/// Everything the device needs before it can use the network, sync its
/// clock or draw a forecast. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfiguration {
    pub(crate) config_portal_ssid: String,
    pub(crate) update_interval: NonZeroU32,
    pub(crate) wifi: WifiSettings,
    pub(crate) weather: WeatherSettings,
    pub(crate) time: TimeSettings,
}

impl DeviceConfiguration {
    /// Compiled-in defaults. Performs no validation.
    pub fn load() -> Self {
        Self {
            config_portal_ssid: defaults::CONFIG_PORTAL_SSID.to_string(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            wifi: WifiSettings {
                ssid: String::new(),
                password: Secret::default(),
                portal_fallback: true,
            },
            weather: WeatherSettings {
                enabled: true,
                city_name: defaults::CITY_NAME.to_string(),
                api_key: Secret::default(),
                location_id: defaults::LOCATION_ID.to_string(),
                language: LanguageCode::Italian,
                metric: true,
                max_forecasts: DEFAULT_MAX_FORECASTS,
            },
            time: TimeSettings {
                utc_offset_hours: defaults::UTC_OFFSET_HOURS,
                dst_start: DstRule::new(
                    "CEST",
                    WeekOrdinal::Last,
                    Weekday::Sunday,
                    Month::March,
                    2,
                    3600,
                ),
                dst_end: DstRule::new(
                    "CET",
                    WeekOrdinal::Last,
                    Weekday::Sunday,
                    Month::October,
                    2,
                    0,
                ),
                ntp_servers: defaults::NTP_SERVERS.iter().map(|s| s.to_string()).collect(),
                ntp_min_valid_epoch: defaults::NTP_MIN_VALID_EPOCH,
                ntp_sync_timeout: DEFAULT_NTP_SYNC_TIMEOUT,
            },
        }
    }

    /// Convert an interchange document and validate the result.
    ///
    /// Issues from both steps are reported together.
    pub fn from_document(doc: ConfigDocument) -> Result<Self, ConfigError> {
        crate::config::validation::convert(doc)
    }

    /// SSID of the access point opened in setup mode.
    pub fn config_portal_ssid(&self) -> &str {
        &self.config_portal_ssid
    }

    pub fn update_interval_secs(&self) -> u32 {
        self.update_interval.get()
    }

    pub fn wifi(&self) -> &WifiSettings {
        &self.wifi
    }

    pub fn weather(&self) -> &WeatherSettings {
        &self.weather
    }

    pub fn time(&self) -> &TimeSettings {
        &self.time
    }

    /// Check the requirements the enabled features place on the values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = Issues::default();
        issues.extend(self.requirement_issues());
        issues.finish()
    }

    pub(crate) fn requirement_issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.config_portal_ssid.is_empty() {
            issues.push(ConfigIssue::missing("configPortalSsid"));
        } else if self.config_portal_ssid.len() > MAX_SSID_LEN {
            issues.push(ConfigIssue::invalid_format(
                "configPortalSsid",
                format!("longer than {} bytes", MAX_SSID_LEN),
            ));
        }

        let wifi = &self.wifi;
        if wifi.ssid.is_empty() {
            if !wifi.portal_fallback {
                issues.push(ConfigIssue::missing("ssid"));
            }
        } else if wifi.ssid.len() > MAX_SSID_LEN {
            issues.push(ConfigIssue::invalid_format(
                "ssid",
                format!("longer than {} bytes", MAX_SSID_LEN),
            ));
        }
        if !wifi.password.is_empty() && !PASSWORD_LEN.contains(&wifi.password.len()) {
            issues.push(ConfigIssue::invalid_format(
                "password",
                format!(
                    "must be empty or {} to {} bytes",
                    PASSWORD_LEN.start(),
                    PASSWORD_LEN.end()
                ),
            ));
        }

        let weather = &self.weather;
        if weather.enabled {
            if weather.api_key.is_empty() {
                issues.push(ConfigIssue::missing("apiKey"));
            }
            if weather.location_id.is_empty() {
                issues.push(ConfigIssue::missing("locationId"));
            }
        }
        if !weather.location_id.is_empty()
            && !weather.location_id.chars().all(|c| c.is_ascii_digit())
        {
            issues.push(ConfigIssue::invalid_format(
                "locationId",
                format!("'{}' is not a numeric id", weather.location_id),
            ));
        }

        let time = &self.time;
        if time.ntp_servers.is_empty() {
            issues.push(ConfigIssue::missing("ntpServers"));
        }
        let hostname = Regex::new(HOSTNAME_PATTERN).expect("Invalid hostname pattern");
        for server in &time.ntp_servers {
            if !is_hostname(&hostname, server) {
                issues.push(ConfigIssue::invalid_format(
                    "ntpServers",
                    format!("'{}' is not a valid hostname", server),
                ));
            }
        }
        if time.ntp_min_valid_epoch < 0 {
            issues.push(ConfigIssue::out_of_range(
                "ntpMinValidEpoch",
                time.ntp_min_valid_epoch,
                ">= 0",
            ));
        }
        if time.dst_start.label().is_empty() {
            issues.push(ConfigIssue::missing("dstStart.label"));
        }
        if time.dst_end.label().is_empty() {
            issues.push(ConfigIssue::missing("dstEnd.label"));
        }
        issues.extend(dst::check_pair(&time.dst_start, &time.dst_end));

        issues
    }

    /// Inverse of [`DeviceConfiguration::from_document`]. Secrets are masked
    /// unless `reveal_secrets` is set.
    pub fn to_document(&self, reveal_secrets: bool) -> ConfigDocument {
        let secret = |s: &Secret| {
            if reveal_secrets {
                s.expose().to_string()
            } else {
                s.masked().to_string()
            }
        };

        ConfigDocument {
            config_portal_ssid: self.config_portal_ssid.clone(),
            update_interval_seconds: i64::from(self.update_interval.get()),
            wifi: WifiDocument {
                ssid: self.wifi.ssid.clone(),
                password: secret(&self.wifi.password),
                portal_fallback: self.wifi.portal_fallback,
            },
            weather: WeatherDocument {
                enabled: self.weather.enabled,
                city_name: self.weather.city_name.clone(),
                api_key: secret(&self.weather.api_key),
                location_id: self.weather.location_id.clone(),
                language_code: self.weather.language.as_str().to_string(),
                metric: self.weather.metric,
                max_forecasts: i64::from(self.weather.max_forecasts.get()),
            },
            time: TimeDocument {
                utc_offset_hours: i64::from(self.time.utc_offset_hours),
                ntp_servers: self.time.ntp_servers.clone(),
                ntp_min_valid_epoch: self.time.ntp_min_valid_epoch,
                ntp_sync_timeout_seconds: i64::from(self.time.ntp_sync_timeout.get()),
                dst_start: rule_document(&self.time.dst_start),
                dst_end: rule_document(&self.time.dst_end),
            },
        }
    }
}

fn rule_document(rule: &DstRule) -> DstRuleDocument {
    DstRuleDocument {
        label: rule.label().to_string(),
        week_ordinal: rule.week().as_str().to_string(),
        weekday: dst::weekday_abbrev(rule.weekday()).to_string(),
        month: dst::month_abbrev(rule.month()).to_string(),
        hour: i64::from(rule.hour()),
        offset_seconds: i64::from(rule.offset_seconds()),
    }
}

fn is_hostname(pattern: &Regex, host: &str) -> bool {
    host.len() <= 253 && pattern.is_match(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> DeviceConfiguration {
        let mut config = DeviceConfiguration::load();
        config.weather.api_key = Secret::new("0123456789abcdef");
        config
    }

    #[test]
    fn test_load_returns_defaults() {
        let config = DeviceConfiguration::load();
        assert_eq!(config.config_portal_ssid(), "ESPaperConfig");
        assert_eq!(config.update_interval_secs(), 1800);
        assert_eq!(config.weather().city_name(), "Genova");
        assert_eq!(config.weather().location_id(), "6542282");
        assert_eq!(config.weather().language(), LanguageCode::Italian);
        assert!(config.weather().metric());
        assert_eq!(config.weather().max_forecasts(), 4);
        assert_eq!(config.time().utc_offset_hours(), 1);
        assert_eq!(config.time().dst_start().label(), "CEST");
        assert_eq!(config.time().dst_end().label(), "CET");
        assert_eq!(
            config.time().ntp_servers(),
            ["0.it.pool.ntp.org", "time.nist.gov", "pool.ntp.org"]
        );
        assert_eq!(config.time().ntp_min_valid_epoch(), 1_533_081_600);
        assert_eq!(config.time().ntp_sync_timeout_secs(), 10);
        assert!(config.weather().api_key().is_empty());
    }

    #[test]
    fn test_defaults_need_api_key_only() {
        let err = DeviceConfiguration::load().validate().unwrap_err();
        assert_eq!(err.issues(), [ConfigIssue::missing("apiKey")]);
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_weather_disabled_does_not_need_api_key() {
        let mut config = DeviceConfiguration::load();
        config.weather.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_ntp_servers_rejected() {
        let mut config = valid();
        config.time.ntp_servers.clear();
        let err = config.validate().unwrap_err();
        assert!(err.contains(&ConfigIssue::missing("ntpServers")));
    }

    #[test]
    fn test_invalid_hostname_rejected() {
        let mut config = valid();
        config.time.ntp_servers = vec!["pool.ntp.org".into(), "bad host".into(), "".into()];
        let err = config.validate().unwrap_err();
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_hostname_pattern() {
        let pattern = Regex::new(HOSTNAME_PATTERN).unwrap();
        assert!(is_hostname(&pattern, "0.it.pool.ntp.org"));
        assert!(is_hostname(&pattern, "localhost"));
        assert!(!is_hostname(&pattern, "-pool.ntp.org"));
        assert!(!is_hostname(&pattern, "pool..ntp.org"));
        assert!(is_hostname(&pattern, &format!("{}a", "a.".repeat(126))));
        assert!(!is_hostname(&pattern, &format!("{}a", "a.".repeat(127))));
    }

    #[test]
    fn test_negative_min_valid_epoch() {
        let mut config = valid();
        config.time.ntp_min_valid_epoch = -1;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.issues(),
            [ConfigIssue::out_of_range("ntpMinValidEpoch", -1, ">= 0")]
        );

        config.time.ntp_min_valid_epoch = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ssid_length_limits() {
        let mut config = valid();
        config.config_portal_ssid = "P".repeat(MAX_SSID_LEN);
        config.wifi.ssid = "W".repeat(MAX_SSID_LEN);
        assert!(config.validate().is_ok());

        config.config_portal_ssid.push('P');
        config.wifi.ssid.push('W');
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.issues(),
            [
                ConfigIssue::invalid_format("configPortalSsid", "longer than 32 bytes"),
                ConfigIssue::invalid_format("ssid", "longer than 32 bytes"),
            ]
        );
    }

    #[test]
    fn test_ssid_required_without_portal_fallback() {
        let mut config = valid();
        config.wifi.portal_fallback = false;
        let err = config.validate().unwrap_err();
        assert!(err.contains(&ConfigIssue::missing("ssid")));

        config.wifi.ssid = "home".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_password_length() {
        let mut config = valid();
        config.wifi.password = Secret::new("short");
        assert!(config.validate().is_err());

        config.wifi.password = Secret::new("long enough");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_location_id_must_be_numeric() {
        let mut config = valid();
        config.weather.location_id = "Genova".into();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.issues(),
            [ConfigIssue::InvalidFormat { field, .. }] if field == "locationId"
        ));
    }

    #[test]
    fn test_inconsistent_dst_rules() {
        let mut config = valid();
        std::mem::swap(&mut config.time.dst_start, &mut config.time.dst_end);
        let err = config.validate().unwrap_err();
        assert!(err
            .issues()
            .iter()
            .all(|i| matches!(i, ConfigIssue::InvalidRule(_))));
    }

    #[test]
    fn test_accepts_epoch() {
        let time = DeviceConfiguration::load().time;
        assert!(!time.accepts_epoch(0));
        assert!(!time.accepts_epoch(1_533_081_599));
        assert!(time.accepts_epoch(1_533_081_600));
        assert_eq!(
            time.standard_offset(),
            UtcOffset::from_hms(1, 0, 0).ok()
        );
    }

    #[test]
    fn test_to_document_masks_secrets() {
        let config = valid();
        let masked = config.to_document(false);
        assert_eq!(masked.weather.api_key, "********");
        assert_eq!(masked.wifi.password, "");

        let revealed = config.to_document(true);
        assert_eq!(revealed.weather.api_key, "0123456789abcdef");
    }

    #[test]
    fn test_debug_never_shows_api_key() {
        let config = valid();
        assert!(!format!("{:?}", config).contains("0123456789abcdef"));
    }
}
