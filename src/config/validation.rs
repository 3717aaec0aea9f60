//! Configuration validation.
//!
//! Turns a loosely typed [`ConfigDocument`] into a [`DeviceConfiguration`],
//! collecting every problem instead of stopping at the first one.

use std::num::{NonZeroU32, NonZeroU8};

use tracing::debug;

use super::types::{ConfigDocument, DstRuleDocument};
use crate::domain::device::{TimeSettings, WeatherSettings, WifiSettings, MAX_FORECAST_LIMIT};
use crate::domain::dst::{self, DstRule, WeekOrdinal, MAX_OFFSET_SECONDS};
use crate::domain::{ConfigError, ConfigIssue, DeviceConfiguration, Issues, LanguageCode, Secret};

const UTC_OFFSET_RANGE: std::ops::RangeInclusive<i64> = -12..=14;

/// Convert and validate a document.
///
/// Values that cannot be converted are reported and replaced by their
/// defaults so the requirement checks still run over the rest of the
/// document. DST consistency is only checked when both rules converted.
pub fn convert(doc: ConfigDocument) -> Result<DeviceConfiguration, ConfigError> {
    let fallback = DeviceConfiguration::load();
    let mut issues = Issues::default();

    let update_interval =
        positive_u32(&mut issues, "updateIntervalSeconds", doc.update_interval_seconds)
            .unwrap_or(fallback.update_interval);

    let language = match doc.weather.language_code.parse::<LanguageCode>() {
        Ok(code) => code,
        Err(issue) => {
            issues.push(issue);
            fallback.weather.language
        }
    };
    let max_forecasts = forecast_count(&mut issues, doc.weather.max_forecasts)
        .unwrap_or(fallback.weather.max_forecasts);

    let utc_offset_hours = if UTC_OFFSET_RANGE.contains(&doc.time.utc_offset_hours) {
        doc.time.utc_offset_hours as i8
    } else {
        issues.push(ConfigIssue::out_of_range(
            "utcOffsetHours",
            doc.time.utc_offset_hours,
            "-12..=14",
        ));
        fallback.time.utc_offset_hours
    };
    let ntp_sync_timeout = positive_u32(
        &mut issues,
        "ntpSyncTimeoutSeconds",
        doc.time.ntp_sync_timeout_seconds,
    )
    .unwrap_or(fallback.time.ntp_sync_timeout);

    let dst_start = rule(&mut issues, "dstStart", &doc.time.dst_start);
    let dst_end = rule(&mut issues, "dstEnd", &doc.time.dst_end);
    let rules_converted = dst_start.is_some() && dst_end.is_some();

    // A rule that failed to convert falls back to the default but keeps the
    // supplied label.
    let dst_start = match dst_start {
        Some(rule) => rule,
        None => fallback.time.dst_start.with_label(doc.time.dst_start.label),
    };
    let dst_end = match dst_end {
        Some(rule) => rule,
        None => fallback.time.dst_end.with_label(doc.time.dst_end.label),
    };

    let config = DeviceConfiguration {
        config_portal_ssid: doc.config_portal_ssid,
        update_interval,
        wifi: WifiSettings {
            ssid: doc.wifi.ssid,
            password: Secret::from(doc.wifi.password),
            portal_fallback: doc.wifi.portal_fallback,
        },
        weather: WeatherSettings {
            enabled: doc.weather.enabled,
            city_name: doc.weather.city_name,
            api_key: Secret::from(doc.weather.api_key),
            location_id: doc.weather.location_id,
            language,
            metric: doc.weather.metric,
            max_forecasts,
        },
        time: TimeSettings {
            utc_offset_hours,
            dst_start,
            dst_end,
            ntp_servers: doc.time.ntp_servers,
            ntp_min_valid_epoch: doc.time.ntp_min_valid_epoch,
            ntp_sync_timeout,
        },
    };

    issues.extend(
        config
            .requirement_issues()
            .into_iter()
            .filter(|issue| rules_converted || !matches!(issue, ConfigIssue::InvalidRule(_))),
    );

    match issues.finish() {
        Ok(()) => {
            debug!("Configuration converted and validated");
            Ok(config)
        }
        Err(e) => {
            debug!("Configuration rejected with {} issue(s)", e.issues().len());
            Err(e)
        }
    }
}

fn positive_u32(issues: &mut Issues, field: &str, value: i64) -> Option<NonZeroU32> {
    let converted = u32::try_from(value).ok().and_then(NonZeroU32::new);
    if converted.is_none() {
        issues.push(ConfigIssue::out_of_range(
            field,
            value,
            &format!("1..={}", u32::MAX),
        ));
    }
    converted
}

fn forecast_count(issues: &mut Issues, value: i64) -> Option<NonZeroU8> {
    let converted = u8::try_from(value)
        .ok()
        .filter(|v| *v <= MAX_FORECAST_LIMIT)
        .and_then(NonZeroU8::new);
    if converted.is_none() {
        issues.push(ConfigIssue::out_of_range(
            "maxForecasts",
            value,
            &format!("1..={}", MAX_FORECAST_LIMIT),
        ));
    }
    converted
}

/// Convert one rule, prefixing field names with the rule's key.
fn rule(issues: &mut Issues, key: &str, doc: &DstRuleDocument) -> Option<DstRule> {
    let mut local = Vec::new();

    let week = doc
        .week_ordinal
        .parse::<WeekOrdinal>()
        .map_err(|e| local.push(e))
        .ok();
    let weekday = dst::parse_weekday(&doc.weekday)
        .map_err(|e| local.push(e))
        .ok();
    let month = dst::parse_month(&doc.month).map_err(|e| local.push(e)).ok();

    let hour = u8::try_from(doc.hour).ok().filter(|h| *h < 24);
    if hour.is_none() {
        local.push(ConfigIssue::out_of_range("hour", doc.hour, "0..=23"));
    }

    let max = i64::from(MAX_OFFSET_SECONDS);
    let offset = i32::try_from(doc.offset_seconds)
        .ok()
        .filter(|o| i64::from(*o).abs() <= max);
    if offset.is_none() {
        local.push(ConfigIssue::out_of_range(
            "offsetSeconds",
            doc.offset_seconds,
            &format!("-{}..={}", max, max),
        ));
    }

    issues.extend(local.into_iter().map(|issue| prefixed(key, issue)));

    Some(DstRule::new(
        doc.label.clone(),
        week?,
        weekday?,
        month?,
        hour?,
        offset?,
    ))
}

fn prefixed(key: &str, issue: ConfigIssue) -> ConfigIssue {
    match issue {
        ConfigIssue::InvalidEnumValue { field, value } => ConfigIssue::InvalidEnumValue {
            field: format!("{}.{}", key, field),
            value,
        },
        ConfigIssue::OutOfRange {
            field,
            value,
            expected,
        } => ConfigIssue::OutOfRange {
            field: format!("{}.{}", key, field),
            value,
            expected,
        },
        other => other,
    }
}
