//! Error types for espaper-config.

use thiserror::Error;

/// A single problem found while building or validating the manifest.
///
/// Field names use the camelCase keys of the interchange document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    /// A value that the enabled features depend on is empty or absent
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// A value outside a fixed enumeration
    #[error("invalid value for {field}: '{value}'")]
    InvalidEnumValue { field: String, value: String },

    /// DST start/end rules that do not describe a consistent year
    #[error("invalid DST rule: {0}")]
    InvalidRule(String),

    /// A number outside its allowed range
    #[error("{field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: String,
        value: i64,
        expected: String,
    },

    /// A string with the wrong shape
    #[error("invalid {field}: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ConfigIssue {
    pub fn missing(field: &str) -> Self {
        Self::MissingRequiredField(field.to_string())
    }

    pub fn invalid_enum(field: &str, value: &str) -> Self {
        Self::InvalidEnumValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn out_of_range(field: &str, value: i64, expected: &str) -> Self {
        Self::OutOfRange {
            field: field.to_string(),
            value,
            expected: expected.to_string(),
        }
    }

    pub fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Every issue found in one validation pass, surfaced together at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.issues))]
pub struct ConfigError {
    issues: Vec<ConfigIssue>,
}

impl ConfigError {
    pub fn new(issues: Vec<ConfigIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    pub fn contains(&self, issue: &ConfigIssue) -> bool {
        self.issues.contains(issue)
    }

    pub fn into_issues(self) -> Vec<ConfigIssue> {
        self.issues
    }
}

fn describe(issues: &[ConfigIssue]) -> String {
    match issues {
        [single] => format!("configuration error: {}", single),
        issues => {
            let joined: Vec<String> = issues.iter().map(ToString::to_string).collect();
            format!("{} configuration errors: {}", issues.len(), joined.join("; "))
        }
    }
}

/// Collects issues and turns them into a `Result` at the end of a pass.
#[derive(Debug, Default)]
pub(crate) struct Issues(Vec<ConfigIssue>);

impl Issues {
    pub(crate) fn push(&mut self, issue: ConfigIssue) {
        self.0.push(issue);
    }

    pub(crate) fn extend(&mut self, other: impl IntoIterator<Item = ConfigIssue>) {
        self.0.extend(other);
    }

    pub(crate) fn finish(self) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::new(self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_issue_display() {
        let err = ConfigError::new(vec![ConfigIssue::missing("ntpServers")]);
        assert_eq!(
            err.to_string(),
            "configuration error: missing required field: ntpServers"
        );
    }

    #[test]
    fn test_multiple_issues_display() {
        let err = ConfigError::new(vec![
            ConfigIssue::missing("apiKey"),
            ConfigIssue::invalid_enum("languageCode", "xx"),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 configuration errors"));
        assert!(msg.contains("apiKey"));
        assert!(msg.contains("'xx'"));
        assert!(msg.contains("apiKey; invalid value"));
    }

    #[test]
    fn test_config_error_is_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(ConfigError::new(vec![ConfigIssue::missing("ssid")]));
        assert_eq!(
            err.to_string(),
            "configuration error: missing required field: ssid"
        );
    }

    #[test]
    fn test_issues_finish() {
        assert!(Issues::default().finish().is_ok());

        let mut issues = Issues::default();
        issues.push(ConfigIssue::out_of_range("maxForecasts", 0, "1..=40"));
        let err = issues.finish().unwrap_err();
        assert!(err.contains(&ConfigIssue::out_of_range("maxForecasts", 0, "1..=40")));
    }
}
