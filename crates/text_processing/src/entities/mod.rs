//! Product and country extraction with origin/destination disambiguation
//!
//! Messages are normalized (lower-cased, punctuation turned into spaces)
//! and scanned as word windows against the lexical index.
//!
//! # Products
//!
//! 1. Every window up to the longest indexed phrase is checked against full
//!    names and aliases; the longest hit wins, then the earliest.
//! 2. Only if that finds nothing, windows of `max_window` down to one word
//!    are checked against every key, including sub-words and categories,
//!    retrying a trailing plural in singular form.
//!
//! # Countries
//!
//! Country mentions are collected with their offsets. For each mention the
//! nearest directional cue between the previous mention and this one
//! decides its role. Without a cue the mention takes the first free slot,
//! origin first. A filled slot is never overwritten.
//!
//! # Example
//!
//! ```ignore
//! let entities = extractor.extract("export silk from India to USA", Language::English);
//! assert_eq!(entities.origin_id().unwrap().as_str(), "india");
//! assert_eq!(entities.destination_id().unwrap().as_str(), "usa");
//! ```

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use trade_query_config::{CueDirection, LexiconConfig};
use trade_query_core::{CountryId, Language, ProductId, QueryIntent, Slot};
use trade_query_knowledge::{normalize_key, IndexEntry, LexicalIndex, MatchKind, TokenIndex};

/// How a country got its role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSource {
    /// A directional cue phrase preceded the mention
    Cue,
    /// No cue; the mention filled the first free slot
    Fallback,
}

/// Matched product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductMatch {
    pub id: ProductId,
    /// Normalized text that matched
    pub matched: String,
    #[serde(skip)]
    pub kind: MatchKind,
}

/// Country with its assigned role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryMatch {
    pub id: CountryId,
    /// Byte offset of the mention in the normalized message
    pub offset: usize,
    pub source: RoleSource,
}

/// Entities found in one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedEntities {
    pub product: Option<ProductMatch>,
    pub origin: Option<CountryMatch>,
    pub destination: Option<CountryMatch>,
}

impl ExtractedEntities {
    pub fn product_id(&self) -> Option<&ProductId> {
        self.product.as_ref().map(|p| &p.id)
    }

    pub fn origin_id(&self) -> Option<&CountryId> {
        self.origin.as_ref().map(|c| &c.id)
    }

    pub fn destination_id(&self) -> Option<&CountryId> {
        self.destination.as_ref().map(|c| &c.id)
    }

    pub fn is_empty(&self) -> bool {
        self.product.is_none() && self.origin.is_none() && self.destination.is_none()
    }

    /// Required slots of `intent` that are still empty, in slot order
    pub fn missing(&self, intent: QueryIntent) -> Vec<Slot> {
        intent
            .required_slots()
            .iter()
            .copied()
            .filter(|slot| match slot {
                Slot::Product => self.product.is_none(),
                Slot::Origin => self.origin.is_none(),
                Slot::Destination => self.destination.is_none(),
            })
            .collect()
    }

    /// Move a fallback-assigned origin into the empty destination slot.
    ///
    /// Used for single-market intents, where "risk of tea in Russia" names
    /// the market rather than the origin. Returns whether anything moved.
    pub fn promote_origin_to_destination(&mut self) -> bool {
        let movable = self.destination.is_none()
            && matches!(&self.origin, Some(o) if o.source == RoleSource::Fallback);
        if movable {
            self.destination = self.origin.take();
        }
        movable
    }
}

/// A word of the normalized message with its byte span
#[derive(Debug, Clone, Copy)]
struct Token {
    start: usize,
    end: usize,
}

/// Normalized message: `padded` is the normalized text with one space on
/// each side, and token offsets refer to it.
struct Normalized {
    padded: String,
}

impl Normalized {
    fn new(text: &str) -> Self {
        Self {
            padded: format!(" {} ", normalize_key(text)),
        }
    }

    fn tokens(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        for word in self.padded.split(' ') {
            if !word.is_empty() {
                tokens.push(Token {
                    start: offset,
                    end: offset + word.len(),
                });
            }
            offset += word.len() + 1;
        }
        tokens
    }

    /// Text spanning `tokens[from..to]`
    fn window(&self, tokens: &[Token], from: usize, to: usize) -> &str {
        &self.padded[tokens[from].start..tokens[to - 1].end]
    }
}

/// A country occurrence before role assignment
#[derive(Debug, Clone)]
struct CountryMention {
    id: CountryId,
    start: usize,
    end: usize,
    kind: MatchKind,
    words: usize,
}

/// A cue phrase compiled to a whole-word pattern
#[derive(Debug, Clone)]
struct CompiledCue {
    pattern: Regex,
    direction: CueDirection,
}

/// A cue occurrence in the padded message
#[derive(Debug, Clone, Copy)]
struct CueHit {
    start: usize,
    end: usize,
    priority: usize,
    direction: CueDirection,
}

/// Entity extractor
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    index: Arc<LexicalIndex>,
    /// Per language: cues in priority order
    cues: HashMap<Language, Vec<CompiledCue>>,
    max_window: usize,
}

impl EntityExtractor {
    pub fn new(index: Arc<LexicalIndex>, lexicons: &LexiconConfig, max_window: usize) -> Self {
        let cues = Language::all()
            .iter()
            .map(|lang| {
                let list = lexicons
                    .cues_for(*lang)
                    .into_iter()
                    .filter_map(|cue| compile_cue(&cue.phrase, cue.direction))
                    .collect();
                (*lang, list)
            })
            .collect();

        Self {
            index,
            cues,
            max_window: max_window.max(1),
        }
    }

    pub fn extract(&self, text: &str, language: Language) -> ExtractedEntities {
        let normalized = Normalized::new(text);
        let tokens = normalized.tokens();

        let product = self.find_product(&normalized, &tokens);
        let mentions = self.find_countries(&normalized, &tokens);
        let (origin, destination) = self.assign_roles(&normalized, &mentions, language);

        let entities = ExtractedEntities {
            product,
            origin,
            destination,
        };

        tracing::debug!(
            product = ?entities.product_id(),
            origin = ?entities.origin_id(),
            destination = ?entities.destination_id(),
            mentions = mentions.len(),
            "Entities extracted"
        );

        entities
    }

    fn find_product(&self, normalized: &Normalized, tokens: &[Token]) -> Option<ProductMatch> {
        let products = &self.index.products;

        // Stage 1: full names and aliases, longest first
        let longest = products.max_words().min(tokens.len());
        for size in (1..=longest).rev() {
            for from in 0..=(tokens.len() - size) {
                let key = normalized.window(tokens, from, from + size);
                if let Some(entry) = products.get(key).filter(|e| e.kind.is_phrase()) {
                    return Some(product_match(key, entry));
                }
            }
        }

        // Stage 2: sliding windows over every key, with plural fallback
        let window = self.max_window.min(tokens.len());
        for size in (1..=window).rev() {
            for from in 0..=(tokens.len() - size) {
                let key = normalized.window(tokens, from, from + size);
                if let Some((matched, entry)) = lookup_with_singular(products, key) {
                    return Some(product_match(&matched, entry));
                }
            }
        }

        None
    }

    fn find_countries(&self, normalized: &Normalized, tokens: &[Token]) -> Vec<CountryMention> {
        let countries = &self.index.countries;
        let longest = countries.max_words().min(tokens.len());

        let mut candidates = Vec::new();
        for size in (1..=longest).rev() {
            for from in 0..=(tokens.len() - size) {
                let key = normalized.window(tokens, from, from + size);
                if let Some(entry) = countries.get(key) {
                    candidates.push(CountryMention {
                        id: entry.id.clone(),
                        start: tokens[from].start,
                        end: tokens[from + size - 1].end,
                        kind: entry.kind,
                        words: size,
                    });
                }
            }
        }

        // Most specific first, then keep what does not overlap
        candidates.sort_by(|a, b| {
            b.kind
                .is_phrase()
                .cmp(&a.kind.is_phrase())
                .then(b.words.cmp(&a.words))
                .then(a.start.cmp(&b.start))
        });

        let mut accepted: Vec<CountryMention> = Vec::new();
        for mention in candidates {
            let overlaps = accepted
                .iter()
                .any(|m| mention.start < m.end && m.start < mention.end);
            let shadowed = !mention.kind.is_phrase()
                && accepted
                    .iter()
                    .any(|m| m.id == mention.id && m.kind.is_phrase());
            if !overlaps && !shadowed {
                accepted.push(mention);
            }
        }

        accepted.sort_by_key(|m| m.start);
        accepted
    }

    fn assign_roles(
        &self,
        normalized: &Normalized,
        mentions: &[CountryMention],
        language: Language,
    ) -> (Option<CountryMatch>, Option<CountryMatch>) {
        let cue_hits = self.find_cues(normalized, language);

        let mut origin: Option<CountryMatch> = None;
        let mut destination: Option<CountryMatch> = None;
        let mut window_start = 0;

        for mention in mentions {
            let cue = nearest_cue(&cue_hits, window_start, mention.start);
            window_start = mention.end;

            let already_assigned = origin.as_ref().map(|c| &c.id) == Some(&mention.id)
                || destination.as_ref().map(|c| &c.id) == Some(&mention.id);
            if already_assigned {
                continue;
            }

            let (wants_origin, source) = match cue.map(|c| c.direction) {
                Some(CueDirection::From) => (true, RoleSource::Cue),
                Some(CueDirection::To) => (false, RoleSource::Cue),
                None => (origin.is_none(), RoleSource::Fallback),
            };

            let country = CountryMatch {
                id: mention.id.clone(),
                offset: mention.start,
                source,
            };

            let (preferred, other) = if wants_origin {
                (&mut origin, &mut destination)
            } else {
                (&mut destination, &mut origin)
            };

            if preferred.is_none() {
                *preferred = Some(country);
            } else if other.is_none() {
                tracing::debug!(country = %mention.id, "Role taken, using the other slot");
                *other = Some(CountryMatch {
                    source: RoleSource::Fallback,
                    ..country
                });
            } else {
                tracing::debug!(country = %mention.id, "Both roles filled, ignoring mention");
            }
        }

        (origin, destination)
    }

    fn find_cues(&self, normalized: &Normalized, language: Language) -> Vec<CueHit> {
        let Some(cues) = self
            .cues
            .get(&language)
            .or_else(|| self.cues.get(&Language::English))
        else {
            return Vec::new();
        };

        cues.iter()
            .enumerate()
            .flat_map(|(priority, cue)| {
                cue.pattern
                    .find_iter(&normalized.padded)
                    .map(move |m| CueHit {
                        start: m.start(),
                        end: m.end(),
                        priority,
                        direction: cue.direction,
                    })
            })
            .collect()
    }
}

/// Normalize a cue phrase the way messages are normalized and anchor it
/// to whole words
fn compile_cue(phrase: &str, direction: CueDirection) -> Option<CompiledCue> {
    let phrase = normalize_key(phrase);
    if phrase.is_empty() {
        return None;
    }
    match Regex::new(&format!(r"\b{}\b", regex::escape(&phrase))) {
        Ok(pattern) => Some(CompiledCue { pattern, direction }),
        Err(e) => {
            tracing::warn!(phrase = %phrase, error = %e, "Skipping cue phrase that does not compile");
            None
        }
    }
}

/// Cue closest before `before`, ignoring anything that starts before
/// `after`. Priority order breaks ties at the same end offset.
fn nearest_cue(hits: &[CueHit], after: usize, before: usize) -> Option<CueHit> {
    hits.iter()
        .filter(|h| h.start >= after && h.end <= before)
        .max_by(|a, b| a.end.cmp(&b.end).then(b.priority.cmp(&a.priority)))
        .copied()
}

fn product_match(key: &str, entry: &IndexEntry<ProductId>) -> ProductMatch {
    ProductMatch {
        id: entry.id.clone(),
        matched: key.to_string(),
        kind: entry.kind,
    }
}

/// Look up `key`, then its singular forms ("-es", "-s")
fn lookup_with_singular<'a>(
    index: &'a TokenIndex<ProductId>,
    key: &str,
) -> Option<(String, &'a IndexEntry<ProductId>)> {
    if let Some(entry) = index.get(key) {
        return Some((key.to_string(), entry));
    }
    for suffix in ["es", "s"] {
        if let Some(stem) = key.strip_suffix(suffix) {
            if stem.chars().count() < 2 {
                continue;
            }
            if let Some(entry) = index.get(stem) {
                return Some((stem.to_string(), entry));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use trade_query_knowledge::KnowledgeBase;

    fn extractor() -> EntityExtractor {
        let kb = KnowledgeBase::builtin().unwrap();
        let lexicons = LexiconConfig::builtin().unwrap();
        let index = Arc::new(LexicalIndex::build(&kb, &lexicons, 3));
        EntityExtractor::new(index, &lexicons, 3)
    }

    fn ids(entities: &ExtractedEntities) -> (Option<&str>, Option<&str>, Option<&str>) {
        (
            entities.product_id().map(|p| p.as_str()),
            entities.origin_id().map(|c| c.as_str()),
            entities.destination_id().map(|c| c.as_str()),
        )
    }

    #[test]
    fn test_export_from_to() {
        let entities = extractor().extract("export silk from India to USA", Language::English);
        assert_eq!(ids(&entities), (Some("silk"), Some("india"), Some("usa")));
        assert_eq!(entities.origin.as_ref().unwrap().source, RoleSource::Cue);
    }

    #[test]
    fn test_reversed_word_order() {
        let entities = extractor().extract("silk to USA from India", Language::English);
        assert_eq!(ids(&entities), (Some("silk"), Some("india"), Some("usa")));
        assert_eq!(entities.destination.as_ref().unwrap().source, RoleSource::Cue);
    }

    #[test]
    fn test_full_name_beats_subword() {
        // "basmati rice" and the lone sub-word "rice" are both present
        let entities = extractor().extract(
            "rice prices: tariff for basmati rice to the UAE",
            Language::English,
        );
        let product = entities.product.unwrap();
        assert_eq!(product.id.as_str(), "basmati_rice");
        assert_eq!(product.kind, MatchKind::FullName);
        assert_eq!(product.matched, "basmati rice");
    }

    #[test]
    fn test_longest_phrase_wins() {
        let entities = extractor().extract("green tea from China to UK", Language::English);
        assert_eq!(entities.product_id().unwrap().as_str(), "green_tea");
    }

    #[test]
    fn test_subword_fallback() {
        let entities = extractor().extract("tariff on pepper into the USA", Language::English);
        let product = entities.product.unwrap();
        assert_eq!(product.id.as_str(), "black_pepper");
        assert_eq!(product.kind, MatchKind::SubWord);
    }

    #[test]
    fn test_plural_fallback() {
        let entities = extractor().extract("duty on teas from India", Language::English);
        assert_eq!(entities.product_id().unwrap().as_str(), "tea");
    }

    #[test]
    fn test_no_cue_fills_origin_first() {
        let entities = extractor().extract("tea India USA tariff", Language::English);
        assert_eq!(ids(&entities), (Some("tea"), Some("india"), Some("usa")));
        assert_eq!(entities.origin.as_ref().unwrap().source, RoleSource::Fallback);
    }

    #[test]
    fn test_nearest_cue_wins() {
        // "to" in "how to" is farther from India than "from"
        let entities = extractor().extract("how to export tea from India", Language::English);
        assert_eq!(ids(&entities), (Some("tea"), Some("india"), None));
    }

    #[test]
    fn test_only_destination() {
        let entities = extractor().extract("tariff for tea to Germany", Language::English);
        assert_eq!(ids(&entities), (Some("tea"), None, Some("germany")));
    }

    #[test]
    fn test_multiword_alias_and_punctuation() {
        let entities = extractor().extract(
            "Ship coffee from Brazil to the United States of America!",
            Language::English,
        );
        assert_eq!(ids(&entities), (Some("coffee"), Some("brazil"), Some("usa")));

        let entities = extractor().extract("tea from India to the U.S.A.", Language::English);
        assert_eq!(entities.destination_id().unwrap().as_str(), "usa");
    }

    #[test]
    fn test_same_country_twice() {
        let entities = extractor().extract("tea from India to India", Language::English);
        assert_eq!(ids(&entities), (Some("tea"), Some("india"), None));
    }

    #[test]
    fn test_conflicting_cue_moves_to_free_slot() {
        let entities = extractor().extract("tea from India from China", Language::English);
        assert_eq!(ids(&entities), (Some("tea"), Some("india"), Some("china")));
        assert_eq!(
            entities.destination.as_ref().unwrap().source,
            RoleSource::Fallback
        );
    }

    #[test]
    fn test_spanish_cues() {
        let entities =
            extractor().extract("¿Cuál es el arancel para té de India a USA?", Language::Spanish);
        assert_eq!(ids(&entities), (Some("tea"), Some("india"), Some("usa")));
    }

    #[test]
    fn test_german_cues() {
        let entities =
            extractor().extract("Zoll für Tee aus Indien nach Deutschland", Language::German);
        assert_eq!(ids(&entities), (Some("tea"), Some("india"), Some("germany")));
    }

    #[test]
    fn test_cues_match_whole_words_only() {
        let ex = extractor();
        let normalized = Normalized::new("Tomorrow, ship it into Japan");
        let hits = ex.find_cues(&normalized, Language::English);
        assert_eq!(hits.len(), 1);
        assert_eq!(&normalized.padded[hits[0].start..hits[0].end], "into");
        assert_eq!(hits[0].direction, CueDirection::To);
    }

    #[test]
    fn test_nothing_found() {
        let entities = extractor().extract("hello, how are you?", Language::English);
        assert!(entities.is_empty());
        assert_eq!(
            entities.missing(QueryIntent::Document),
            vec![Slot::Product, Slot::Origin, Slot::Destination]
        );
    }

    #[test]
    fn test_promote_origin() {
        let mut entities = extractor().extract("risk of tea in Russia", Language::English);
        assert_eq!(entities.origin_id().unwrap().as_str(), "russia");
        assert!(entities.promote_origin_to_destination());
        assert_eq!(ids(&entities), (Some("tea"), None, Some("russia")));

        let mut cued = extractor().extract("profit on tea from India", Language::English);
        assert!(!cued.promote_origin_to_destination());
        assert_eq!(cued.origin_id().unwrap().as_str(), "india");
    }
}
