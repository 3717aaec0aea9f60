//! Weather provider language codes.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::ConfigIssue;

/// Language of the condition descriptions returned by the weather provider.
///
/// The codes are the provider's own, which is why Czech is `cz`, Korean `kr`
/// and Ukrainian `ua` rather than their ISO 639-1 forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LanguageCode {
    Arabic,
    Bulgarian,
    Catalan,
    Czech,
    German,
    Greek,
    English,
    Persian,
    Finnish,
    French,
    Galician,
    Croatian,
    Hungarian,
    #[default]
    Italian,
    Japanese,
    Korean,
    Latvian,
    Lithuanian,
    Macedonian,
    Dutch,
    Polish,
    Portuguese,
    Romanian,
    Russian,
    Swedish,
    Slovak,
    Slovenian,
    Spanish,
    Turkish,
    Ukrainian,
    Vietnamese,
    ChineseSimplified,
    ChineseTraditional,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 33] = [
        Self::Arabic,
        Self::Bulgarian,
        Self::Catalan,
        Self::Czech,
        Self::German,
        Self::Greek,
        Self::English,
        Self::Persian,
        Self::Finnish,
        Self::French,
        Self::Galician,
        Self::Croatian,
        Self::Hungarian,
        Self::Italian,
        Self::Japanese,
        Self::Korean,
        Self::Latvian,
        Self::Lithuanian,
        Self::Macedonian,
        Self::Dutch,
        Self::Polish,
        Self::Portuguese,
        Self::Romanian,
        Self::Russian,
        Self::Swedish,
        Self::Slovak,
        Self::Slovenian,
        Self::Spanish,
        Self::Turkish,
        Self::Ukrainian,
        Self::Vietnamese,
        Self::ChineseSimplified,
        Self::ChineseTraditional,
    ];

    /// Code as sent to the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arabic => "ar",
            Self::Bulgarian => "bg",
            Self::Catalan => "ca",
            Self::Czech => "cz",
            Self::German => "de",
            Self::Greek => "el",
            Self::English => "en",
            Self::Persian => "fa",
            Self::Finnish => "fi",
            Self::French => "fr",
            Self::Galician => "gl",
            Self::Croatian => "hr",
            Self::Hungarian => "hu",
            Self::Italian => "it",
            Self::Japanese => "ja",
            Self::Korean => "kr",
            Self::Latvian => "la",
            Self::Lithuanian => "lt",
            Self::Macedonian => "mk",
            Self::Dutch => "nl",
            Self::Polish => "pl",
            Self::Portuguese => "pt",
            Self::Romanian => "ro",
            Self::Russian => "ru",
            Self::Swedish => "se",
            Self::Slovak => "sk",
            Self::Slovenian => "sl",
            Self::Spanish => "es",
            Self::Turkish => "tr",
            Self::Ukrainian => "ua",
            Self::Vietnamese => "vi",
            Self::ChineseSimplified => "zh_cn",
            Self::ChineseTraditional => "zh_tw",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = ConfigIssue;

    /// Exact, case-sensitive match against the provider codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ConfigIssue::invalid_enum("languageCode", s))
    }
}
