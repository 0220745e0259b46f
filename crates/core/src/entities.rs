//! Knowledge base entities: products and countries

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::Language;

/// Stable product identifier (e.g. `tea`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

/// Stable country identifier (e.g. `india`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(pub String);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

impl_id!(ProductId);
impl_id!(CountryId);

/// Qualitative low/medium/high scale used for risk, demand and competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[serde(alias = "LOW", alias = "Low")]
    Low,
    #[default]
    #[serde(alias = "MEDIUM", alias = "Medium")]
    Medium,
    #[serde(alias = "HIGH", alias = "High")]
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Either-high-wins aggregation: the worse of the two levels
    pub fn combine(self, other: Level) -> Level {
        self.max(other)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tradeable product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub hs_code: String,
    #[serde(default)]
    pub description: String,
    pub risk_level: Level,
    /// Average import tariff in percent
    pub average_tariff: f64,
    pub demand_level: Level,
    /// Alternative names users type for this product
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Display names used when answering in another language
    #[serde(default)]
    pub localized_names: HashMap<Language, String>,
}

impl Product {
    /// Name to show in a `language` answer, falling back to `name`
    pub fn display_name(&self, language: Language) -> &str {
        self.localized_names
            .get(&language)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }
}

/// A trading country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    /// ISO-like short code (e.g. `IN`, `US`)
    pub code: String,
    pub region: String,
    pub currency: String,
    pub language: String,
    pub risk_level: Level,
    /// World-Bank style ease-of-business score, 0-100
    pub ease_of_business: u8,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub localized_names: HashMap<Language, String>,
}

impl Country {
    pub fn display_name(&self, language: Language) -> &str {
        self.localized_names
            .get(&language)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }
}
