//! Rendering of manifests and validation reports.

use anyhow::Result;
use std::fmt::Write as _;
use tracing::debug;

use crate::cli::Format;
use crate::config::ConfigDocument;
use crate::domain::{ConfigError, DeviceConfiguration, SECRET_MASK};

/// Renders the manifest for the CLI.
pub struct ReportService {
    format: Format,
    reveal_secrets: bool,
}

impl ReportService {
    /// Create a new ReportService with the specified output format.
    pub fn new(format: Format, reveal_secrets: bool) -> Self {
        Self {
            format,
            reveal_secrets,
        }
    }

    /// Render a validated configuration as an interchange document.
    pub fn render_config(&self, config: &DeviceConfiguration) -> Result<String> {
        self.render(&config.to_document(self.reveal_secrets))
    }

    /// Render a document that may not validate, masking secrets the same way.
    pub fn render_document(&self, doc: &ConfigDocument) -> Result<String> {
        let mut doc = doc.clone();
        if !self.reveal_secrets {
            mask(&mut doc.wifi.password);
            mask(&mut doc.weather.api_key);
        }
        self.render(&doc)
    }

    fn render(&self, doc: &ConfigDocument) -> Result<String> {
        debug!("Rendering manifest as {:?}", self.format);
        let out = match self.format {
            Format::Json => serde_json::to_string_pretty(doc)?,
            Format::Toml => toml::to_string(doc)?,
        };
        Ok(out)
    }

    /// Short human-readable description of a validated configuration.
    pub fn summary(config: &DeviceConfiguration) -> String {
        let wifi = config.wifi();
        let weather = config.weather();
        let time = config.time();

        let mut out = String::new();
        let _ = writeln!(out, "Portal SSID:  {}", config.config_portal_ssid());

        let network = if wifi.ssid().is_empty() {
            "<from setup portal>".to_string()
        } else if wifi.password().is_empty() {
            format!("{} (open)", wifi.ssid())
        } else {
            format!("{} (password set)", wifi.ssid())
        };
        let _ = writeln!(out, "Wi-Fi:        {}", network);

        if weather.enabled() {
            let _ = writeln!(
                out,
                "Weather:      {} (id {}), lang {}, {}, {} forecasts, every {}s",
                weather.city_name(),
                weather.location_id(),
                weather.language(),
                if weather.metric() { "metric" } else { "imperial" },
                weather.max_forecasts(),
                config.update_interval_secs()
            );
        } else {
            let _ = writeln!(out, "Weather:      disabled");
        }

        let _ = writeln!(
            out,
            "Time:         UTC{:+}, {} / {}",
            time.utc_offset_hours(),
            time.dst_start(),
            time.dst_end()
        );
        let _ = writeln!(
            out,
            "NTP:          {} (timeout {}s, min epoch {})",
            time.ntp_servers().join(", "),
            time.ntp_sync_timeout_secs(),
            time.ntp_min_valid_epoch()
        );
        out
    }

    /// One line per issue.
    pub fn issue_lines(err: &ConfigError) -> Vec<String> {
        err.issues()
            .iter()
            .map(|issue| format!("  - {}", issue))
            .collect()
    }
}

fn mask(value: &mut String) {
    if !value.is_empty() {
        *value = SECRET_MASK.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigIssue;

    fn config() -> DeviceConfiguration {
        let mut doc = ConfigDocument::default();
        doc.wifi.ssid = "gattini".to_string();
        doc.wifi.password = "freud1988".to_string();
        doc.weather.api_key = "feffd2f6c1d7".to_string();
        DeviceConfiguration::from_document(doc).unwrap()
    }

    #[test]
    fn test_render_json_masks_secrets() {
        let out = ReportService::new(Format::Json, false)
            .render_config(&config())
            .unwrap();
        assert!(!out.contains("feffd2f6c1d7"));
        assert!(!out.contains("freud1988"));
        assert!(out.contains(r#""apiKey": "********""#));
        assert!(out.contains(r#""ssid": "gattini""#));
    }

    #[test]
    fn test_render_toml_reveals_when_asked() {
        let out = ReportService::new(Format::Toml, true)
            .render_config(&config())
            .unwrap();
        assert!(out.contains(r#"apiKey = "feffd2f6c1d7""#));

        let doc: ConfigDocument = toml::from_str(&out).unwrap();
        assert_eq!(DeviceConfiguration::from_document(doc).unwrap(), config());
    }

    #[test]
    fn test_render_invalid_document_masks_secrets() {
        let mut doc = ConfigDocument::default();
        doc.weather.api_key = "feffd2f6c1d7".to_string();
        doc.time.ntp_servers.clear();

        let out = ReportService::new(Format::Json, false)
            .render_document(&doc)
            .unwrap();
        assert!(!out.contains("feffd2f6c1d7"));
        assert!(out.contains(r#""ntpServers": []"#));
    }

    #[test]
    fn test_summary() {
        let summary = ReportService::summary(&config());
        assert!(summary.contains("gattini (password set)"));
        assert!(summary.contains("Genova (id 6542282), lang it, metric, 4 forecasts, every 1800s"));
        assert!(summary.contains("UTC+1"));
        assert!(summary.contains("0.it.pool.ntp.org, time.nist.gov, pool.ntp.org"));
        assert!(!summary.contains("feffd2f6c1d7"));
    }

    #[test]
    fn test_issue_lines() {
        let err = ConfigError::new(vec![
            ConfigIssue::missing("apiKey"),
            ConfigIssue::missing("ntpServers"),
        ]);
        assert_eq!(
            ReportService::issue_lines(&err),
            [
                "  - missing required field: apiKey",
                "  - missing required field: ntpServers"
            ]
        );
    }
}
