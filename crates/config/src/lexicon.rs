//! Language lexicons: detection markers, directional cue phrases, intent
//! keywords and the curated country alias table
//!
//! All keys are matched against lower-cased text, so entries are
//! lower-cased on load.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use trade_query_core::{Language, QueryIntent};

use crate::{parse_builtin, read_data_file, ConfigError};

const BUILTIN_LEXICONS: &str = include_str!("../data/lexicons.yaml");

/// Which role a cue phrase assigns to the country after it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueDirection {
    /// The following country is the origin
    From,
    /// The following country is the destination
    To,
}

/// A directional marker such as "export from" or "to"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuePhrase {
    pub phrase: String,
    pub direction: CueDirection,
}

/// Keyword sets for one language
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentKeywords {
    #[serde(default)]
    pub document: Vec<String>,
    #[serde(default)]
    pub profit: Vec<String>,
    #[serde(default)]
    pub risk: Vec<String>,
    #[serde(default)]
    pub tariff: Vec<String>,
}

impl IntentKeywords {
    pub fn for_intent(&self, intent: QueryIntent) -> &[String] {
        match intent {
            QueryIntent::Document => &self.document,
            QueryIntent::Profit => &self.profit,
            QueryIntent::Risk => &self.risk,
            QueryIntent::Tariff => &self.tariff,
            QueryIntent::General => &[],
        }
    }

    fn is_empty(&self) -> bool {
        self.document.is_empty()
            && self.profit.is_empty()
            && self.risk.is_empty()
            && self.tariff.is_empty()
    }

    fn normalize(&mut self) {
        for list in [
            &mut self.document,
            &mut self.profit,
            &mut self.risk,
            &mut self.tariff,
        ] {
            lowercase_all(list);
        }
    }
}

/// Lexicon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Language-distinctive words used by the detector
    #[serde(default)]
    pub language_markers: HashMap<Language, Vec<String>>,

    /// Directional cues per language, highest priority first
    #[serde(default)]
    pub cue_phrases: HashMap<Language, Vec<CuePhrase>>,

    #[serde(default)]
    pub intent_keywords: HashMap<Language, IntentKeywords>,

    /// Curated aliases keyed by country id (e.g. `usa: [america, states]`)
    #[serde(default)]
    pub country_aliases: HashMap<String, Vec<String>>,
}

impl LexiconConfig {
    /// The lexicons shipped with the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        let mut config: Self = parse_builtin("lexicons", BUILTIN_LEXICONS)?;
        config.normalize();
        config.check()?;
        Ok(config)
    }

    /// Load from a YAML or JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config: Self = read_data_file(path)?;
        config.normalize();
        config.check()?;
        Ok(config)
    }

    pub fn load_or_builtin(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    pub fn markers(&self, language: Language) -> &[String] {
        self.language_markers
            .get(&language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cues to try for a message in `language`: English cues first (in
    /// priority order), then the language's own table.
    pub fn cues_for(&self, language: Language) -> Vec<&CuePhrase> {
        let mut cues: Vec<&CuePhrase> = self
            .cue_phrases
            .get(&Language::English)
            .map(|c| c.iter().collect())
            .unwrap_or_default();

        if language != Language::English {
            if let Some(extra) = self.cue_phrases.get(&language) {
                for cue in extra {
                    if !cues.iter().any(|c| c.phrase == cue.phrase) {
                        cues.push(cue);
                    }
                }
            }
        }
        cues
    }

    /// Keywords for an intent in `language` followed by the English ones
    pub fn keywords_for(&self, language: Language, intent: QueryIntent) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let mut push_from = |lang: Language| {
            if let Some(keywords) = self.intent_keywords.get(&lang) {
                for kw in keywords.for_intent(intent) {
                    if !out.contains(&kw.as_str()) {
                        out.push(kw.as_str());
                    }
                }
            }
        };
        push_from(language);
        if language != Language::English {
            push_from(Language::English);
        }
        out
    }

    pub fn aliases_for(&self, country_id: &str) -> &[String] {
        self.country_aliases
            .get(country_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Validate the configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self
            .cue_phrases
            .get(&Language::English)
            .map(|c| c.is_empty())
            .unwrap_or(true)
        {
            errors.push("cue_phrases.en must not be empty".to_string());
        }

        if self
            .intent_keywords
            .get(&Language::English)
            .map(|k| k.is_empty())
            .unwrap_or(true)
        {
            errors.push("intent_keywords.en must not be empty".to_string());
        }

        for (lang, cues) in &self.cue_phrases {
            for cue in cues {
                if cue.phrase.trim().is_empty() {
                    errors.push(format!("cue_phrases.{}: empty phrase", lang));
                }
            }
        }

        for (lang, markers) in &self.language_markers {
            if markers.iter().any(|m| m.trim().is_empty()) {
                errors.push(format!("language_markers.{}: empty marker", lang));
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
            field: "lexicons".to_string(),
            message: errors.join("; "),
        })
    }

    fn normalize(&mut self) {
        for markers in self.language_markers.values_mut() {
            lowercase_all(markers);
        }
        for cues in self.cue_phrases.values_mut() {
            for cue in cues.iter_mut() {
                cue.phrase = cue.phrase.trim().to_lowercase();
            }
        }
        for keywords in self.intent_keywords.values_mut() {
            keywords.normalize();
        }
        for aliases in self.country_aliases.values_mut() {
            lowercase_all(aliases);
        }
    }
}

fn lowercase_all(list: &mut Vec<String>) {
    for item in list.iter_mut() {
        *item = item.trim().to_lowercase();
    }
    list.dedup();
}
