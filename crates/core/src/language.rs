//! Supported query languages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the engine can detect and answer in
///
/// Serialized as the ISO 639-1 code so lexicon and template files can be
/// keyed by `en`, `es`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en", alias = "english")]
    English,
    #[serde(rename = "es", alias = "spanish")]
    Spanish,
    #[serde(rename = "fr", alias = "french")]
    French,
    #[serde(rename = "de", alias = "german")]
    German,
    #[serde(rename = "hi", alias = "hindi")]
    Hindi,
}

impl Language {
    /// Get ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Hindi => "hi",
        }
    }

    /// Parse from a code or name, case-insensitive.
    ///
    /// Accepts region-tagged codes such as `es-MX` or `fr_CA`.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        let primary = lower
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default();
        match primary {
            "en" | "eng" | "english" => Some(Self::English),
            "es" | "spa" | "spanish" | "español" | "espanol" => Some(Self::Spanish),
            "fr" | "fra" | "fre" | "french" | "français" | "francais" => Some(Self::French),
            "de" | "deu" | "ger" | "german" | "deutsch" => Some(Self::German),
            "hi" | "hin" | "hindi" | "हिन्दी" | "हिंदी" => Some(Self::Hindi),
            _ => None,
        }
    }

    /// All supported languages, in detection tie-break order
    pub fn all() -> &'static [Language] {
        &[
            Self::English,
            Self::Spanish,
            Self::French,
            Self::German,
            Self::Hindi,
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
