//! Intent Classification
//!
//! Maps a message to exactly one [`QueryIntent`] using per-language keyword
//! sets. Categories are tried in a fixed order (document, profit, risk,
//! tariff); the first one with a keyword in the lower-cased message wins,
//! and `general` is returned when nothing matches.
//!
//! A keyword has to start at a word boundary but may run on into a longer
//! word, so `opportunit` matches "opportunities" while `earning` stays quiet
//! inside "learning". Keywords for the resolved language are checked
//! together with the English ones, since trade terms are often written in
//! English.

use std::collections::HashMap;

use regex::Regex;

use trade_query_config::LexiconConfig;
use trade_query_core::{Language, QueryIntent};

/// Classification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intent: QueryIntent,
    /// Keyword that decided the intent, if any
    pub matched_keyword: Option<String>,
}

/// Keyword-set intent classifier
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    /// Per language: intents in priority order with their compiled keywords
    keyword_sets: HashMap<Language, Vec<(QueryIntent, Regex)>>,
}

impl IntentClassifier {
    pub fn new(lexicons: &LexiconConfig) -> Self {
        let keyword_sets = Language::all()
            .iter()
            .map(|lang| {
                let sets = QueryIntent::priority_order()
                    .iter()
                    .filter_map(|intent| {
                        let keywords = lexicons.keywords_for(*lang, *intent);
                        compile_keywords(&keywords).map(|regex| (*intent, regex))
                    })
                    .collect();
                (*lang, sets)
            })
            .collect();

        Self { keyword_sets }
    }

    pub fn classify(&self, text: &str, language: Language) -> Classification {
        let lower = text.to_lowercase();

        let sets = self
            .keyword_sets
            .get(&language)
            .or_else(|| self.keyword_sets.get(&Language::English));

        if let Some(sets) = sets {
            for (intent, pattern) in sets {
                if let Some(m) = pattern.find(&lower) {
                    tracing::debug!(intent = %intent, keyword = %m.as_str(), "Intent classified");
                    return Classification {
                        intent: *intent,
                        matched_keyword: Some(m.as_str().to_string()),
                    };
                }
            }
        }

        Classification {
            intent: QueryIntent::General,
            matched_keyword: None,
        }
    }
}

/// One word-start anchored alternation; longer keywords first so the
/// reported match is the most complete one
fn compile_keywords(keywords: &[&str]) -> Option<Regex> {
    let mut escaped: Vec<String> = keywords
        .iter()
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .map(|kw| regex::escape(&kw))
        .collect();
    if escaped.is_empty() {
        return None;
    }
    escaped.sort_by(|a, b| b.len().cmp(&a.len()));

    let pattern = format!(r"\b(?:{})", escaped.join("|"));
    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping keyword set that does not compile");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new(&LexiconConfig::builtin().unwrap())
    }

    #[test]
    fn test_tariff() {
        let result = classifier().classify(
            "What is the tariff for tea from India to USA?",
            Language::English,
        );
        assert_eq!(result.intent, QueryIntent::Tariff);
        assert_eq!(result.matched_keyword.as_deref(), Some("tariff"));
    }

    #[test]
    fn test_document_beats_tariff() {
        let result = classifier().classify(
            "Which documents are required and what duty applies?",
            Language::English,
        );
        assert_eq!(result.intent, QueryIntent::Document);
    }

    #[test]
    fn test_profit_beats_risk() {
        let result = classifier().classify("Is the US market risky for silk?", Language::English);
        assert_eq!(result.intent, QueryIntent::Profit);
    }

    #[test]
    fn test_risk_beats_tariff() {
        let result = classifier().classify(
            "What is the risk of tariff changes for tea to Russia?",
            Language::English,
        );
        assert_eq!(result.intent, QueryIntent::Risk);
    }

    #[test]
    fn test_general() {
        let result = classifier().classify("hello there", Language::English);
        assert_eq!(result.intent, QueryIntent::General);
        assert!(result.matched_keyword.is_none());
    }

    #[test]
    fn test_localized_keywords() {
        let c = classifier();
        assert_eq!(
            c.classify("¿Cuál es el arancel para té?", Language::Spanish).intent,
            QueryIntent::Tariff
        );
        assert_eq!(
            c.classify("Welche Unterlagen brauche ich?", Language::German).intent,
            QueryIntent::Document
        );
        assert_eq!(
            c.classify("चाय निर्यात में कितना जोखिम है?", Language::Hindi).intent,
            QueryIntent::Risk
        );
    }

    #[test]
    fn test_english_keywords_apply_to_other_languages() {
        let result = classifier().classify("¿Cuál es el tariff para té?", Language::Spanish);
        assert_eq!(result.intent, QueryIntent::Tariff);
    }

    #[test]
    fn test_keyword_must_start_a_word() {
        let c = classifier();
        let result = c.classify(
            "I want to learn the tariff for tea from India to USA",
            Language::English,
        );
        assert_eq!(result.intent, QueryIntent::Tariff);
        assert_eq!(result.matched_keyword.as_deref(), Some("tariff"));

        assert_eq!(
            c.classify("please help me learn", Language::English).intent,
            QueryIntent::General
        );
    }

    #[test]
    fn test_stems_match_longer_words() {
        let c = classifier();
        let result = c.classify("What are the earnings from silk in Japan?", Language::English);
        assert_eq!(result.intent, QueryIntent::Profit);
        assert_eq!(result.matched_keyword.as_deref(), Some("earnings"));

        assert_eq!(
            c.classify("export opportunities in Brazil", Language::English).intent,
            QueryIntent::Profit
        );
        assert_eq!(
            c.classify("¿Es rentable el café en Japón?", Language::Spanish).intent,
            QueryIntent::Profit
        );
        assert_eq!(
            c.classify("Quelle est la rentabilité du thé ?", Language::French).intent,
            QueryIntent::Profit
        );
    }

    #[test]
    fn test_case_insensitive() {
        let result = classifier().classify("TARIFF FOR TEA", Language::English);
        assert_eq!(result.intent, QueryIntent::Tariff);
    }
}
