//! Credential wrapper that keeps its value out of logs.

use std::fmt;

/// Mask printed in place of a secret value.
pub const SECRET_MASK: &str = "********";

/// Opaque credential such as the weather API key or the Wi-Fi password.
///
/// `Debug` and `Display` never show the content. Call [`Secret::expose`]
/// at the one place the raw value is handed to the collaborator that needs it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Value suitable for printing: the mask, or empty when unset.
    pub fn masked(&self) -> &'static str {
        if self.0.is_empty() {
            ""
        } else {
            SECRET_MASK
        }
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", self.masked())
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_hide_value() {
        let secret = Secret::new("feffd2f6c1d7");
        assert_eq!(format!("{:?}", secret), "Secret(********)");
        assert_eq!(secret.to_string(), SECRET_MASK);
        assert!(!format!("{:?}", secret).contains("feffd2f6c1d7"));
        assert_eq!(secret.expose(), "feffd2f6c1d7");
    }

    #[test]
    fn test_empty_secret_masks_to_empty() {
        let secret = Secret::default();
        assert!(secret.is_empty());
        assert_eq!(secret.masked(), "");
    }
}
