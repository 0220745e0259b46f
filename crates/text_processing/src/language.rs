//! Heuristic language detection
//!
//! Counts distinct language-distinctive marker words per language. The
//! highest count wins when it reaches the configured minimum; otherwise the
//! message is treated as English. Ties go to the language listed first in
//! [`Language::all`].

use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

use trade_query_config::LexiconConfig;
use trade_query_core::Language;

/// Detection result with per-language marker counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDetection {
    pub language: Language,
    /// Distinct markers matched for the chosen language
    pub matches: usize,
    pub scores: Vec<(Language, usize)>,
}

/// Marker-based language detector
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    markers: Vec<(Language, HashSet<String>)>,
    min_matches: usize,
}

impl LanguageDetector {
    pub fn new(lexicons: &LexiconConfig, min_matches: usize) -> Self {
        let markers = Language::all()
            .iter()
            .map(|lang| {
                let set = lexicons.markers(*lang).iter().cloned().collect();
                (*lang, set)
            })
            .collect();

        Self {
            markers,
            min_matches: min_matches.max(1),
        }
    }

    pub fn detect(&self, text: &str) -> LanguageDetection {
        let lower = text.to_lowercase();
        // Distinct tokens, so a repeated word counts once
        let words: HashSet<&str> = lower.unicode_words().collect();

        let scores: Vec<(Language, usize)> = self
            .markers
            .iter()
            .map(|(lang, markers)| {
                let count = words.iter().filter(|w| markers.contains(**w)).count();
                (*lang, count)
            })
            .collect();

        let mut best = (Language::English, 0usize);
        for (lang, count) in &scores {
            if *count > best.1 {
                best = (*lang, *count);
            }
        }

        let language = if best.1 >= self.min_matches {
            best.0
        } else {
            Language::English
        };

        tracing::debug!(
            language = %language,
            matches = best.1,
            "Language detected"
        );

        LanguageDetection {
            language,
            matches: if language == best.0 { best.1 } else { 0 },
            scores,
        }
    }
}
