//! Response templates keyed by (language, template id)
//!
//! English must define every template and phrase. Other languages may be
//! partial; lookups fall back to English per entry.
//!
//! Templates use `{placeholder}` syntax and are filled with [`fill`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use trade_query_core::Language;

use crate::{parse_builtin, read_data_file, ConfigError};

const BUILTIN_TEMPLATES: &str = include_str!("../data/templates.yaml");

/// Response template identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    TariffExact,
    TariffNoMatch,
    DocumentExact,
    DocumentNoMatch,
    ProfitExact,
    ProfitNoMatch,
    RiskExact,
    RiskNoMatch,
    Clarify,
    General,
}

impl TemplateId {
    pub fn all() -> &'static [TemplateId] {
        &[
            Self::TariffExact,
            Self::TariffNoMatch,
            Self::DocumentExact,
            Self::DocumentNoMatch,
            Self::ProfitExact,
            Self::ProfitNoMatch,
            Self::RiskExact,
            Self::RiskNoMatch,
            Self::Clarify,
            Self::General,
        ]
    }
}

/// Short localized fragments used inside templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phrase {
    Product,
    Origin,
    Destination,
    Required,
    Optional,
    None,
    And,
    Low,
    Medium,
    High,
    Political,
    Economic,
    Tariff,
    Compliance,
    Market,
    Margin,
    Demand,
    Competition,
    IntentTariff,
    IntentDocument,
    IntentProfit,
    IntentRisk,
    IntentGeneral,
}

impl Phrase {
    pub fn all() -> &'static [Phrase] {
        &[
            Self::Product,
            Self::Origin,
            Self::Destination,
            Self::Required,
            Self::Optional,
            Self::None,
            Self::And,
            Self::Low,
            Self::Medium,
            Self::High,
            Self::Political,
            Self::Economic,
            Self::Tariff,
            Self::Compliance,
            Self::Market,
            Self::Margin,
            Self::Demand,
            Self::Competition,
            Self::IntentTariff,
            Self::IntentDocument,
            Self::IntentProfit,
            Self::IntentRisk,
            Self::IntentGeneral,
        ]
    }
}

/// Templates and phrases for one language
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguagePack {
    #[serde(default)]
    pub templates: HashMap<TemplateId, String>,
    #[serde(default)]
    pub phrases: HashMap<Phrase, String>,
}

/// Template table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateTable {
    languages: HashMap<Language, LanguagePack>,
}

impl TemplateTable {
    /// The templates shipped with the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        let table: Self = parse_builtin("templates", BUILTIN_TEMPLATES)?;
        table.check()?;
        Ok(table)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let table: Self = read_data_file(path)?;
        table.check()?;
        Ok(table)
    }

    pub fn load_or_builtin(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    /// Template for `language`, or the English one when it has none
    pub fn template(&self, language: Language, id: TemplateId) -> &str {
        self.lookup(language, |pack| pack.templates.get(&id))
    }

    /// Phrase for `language`, or the English one when it has none
    pub fn phrase(&self, language: Language, phrase: Phrase) -> &str {
        self.lookup(language, |pack| pack.phrases.get(&phrase))
    }

    /// Whether `language` defines its own version of `id`
    pub fn has_template(&self, language: Language, id: TemplateId) -> bool {
        self.languages
            .get(&language)
            .map(|pack| pack.templates.contains_key(&id))
            .unwrap_or(false)
    }

    fn lookup<'a, F>(&'a self, language: Language, get: F) -> &'a str
    where
        F: Fn(&'a LanguagePack) -> Option<&'a String>,
    {
        self.languages
            .get(&language)
            .and_then(&get)
            .or_else(|| self.languages.get(&Language::English).and_then(&get))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Validate that English is complete
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let Some(english) = self.languages.get(&Language::English) else {
            return Err(vec!["templates: English (en) is required".to_string()]);
        };

        let mut errors = Vec::new();
        for id in TemplateId::all() {
            if !english.templates.contains_key(id) {
                errors.push(format!("templates.en: missing template {:?}", id));
            }
        }
        for phrase in Phrase::all() {
            if !english.phrases.contains_key(phrase) {
                errors.push(format!("templates.en: missing phrase {:?}", phrase));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.validate().map_err(|errors| ConfigError::InvalidValue {
            field: "templates".to_string(),
            message: errors.join("; "),
        })
    }
}

/// Replace every `{key}` in `template` with its value
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_complete_for_english() {
        let table = TemplateTable::builtin().unwrap();
        for id in TemplateId::all() {
            assert!(!table.template(Language::English, *id).is_empty());
        }
    }

    #[test]
    fn test_fallback_to_english() {
        let table = TemplateTable::builtin().unwrap();
        assert!(!table.has_template(Language::Hindi, TemplateId::RiskExact));
        assert_eq!(
            table.template(Language::Hindi, TemplateId::RiskExact),
            table.template(Language::English, TemplateId::RiskExact)
        );
        assert_ne!(
            table.template(Language::Spanish, TemplateId::General),
            table.template(Language::English, TemplateId::General)
        );
    }

    #[test]
    fn test_missing_english_rejected() {
        let yaml = "es:\n  templates:\n    general: hola\n";
        let table: TemplateTable = serde_yaml::from_str(yaml).unwrap();
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_fill() {
        let out = fill("{a} and {b}, {a}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and y, x");
        assert_eq!(fill("{unknown}", &[]), "{unknown}");
    }
}
