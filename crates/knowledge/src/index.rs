//! Lexical indexes: normalized token or phrase to entity id
//!
//! Registrations per entity:
//! - the full name (`FullName`)
//! - each declared alias, plus the curated country alias table (`Alias`)
//! - each word of a multi-word name longer than the sub-word threshold (`SubWord`)
//! - the product category (`Category`)
//!
//! When several entities claim the same key, a full-name or alias claim
//! beats any single-word claim. A key still claimed by more than one
//! entity after that is ambiguous and left out of the index.

use std::collections::HashMap;
use std::hash::Hash;

use once_cell::sync::Lazy;
use regex::Regex;

use trade_query_config::LexiconConfig;
use trade_query_core::{CountryId, ProductId};

use crate::store::KnowledgeBase;

/// How an index key was registered, least specific first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchKind {
    Category,
    SubWord,
    Alias,
    FullName,
}

impl MatchKind {
    /// Full names and aliases identify an entity on their own
    pub fn is_phrase(&self) -> bool {
        matches!(self, Self::Alias | Self::FullName)
    }
}

/// Resolved index entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry<Id> {
    pub id: Id,
    pub kind: MatchKind,
    /// Number of words in the key
    pub words: usize,
}

/// Lower-case the text and turn every non-word character into a single
/// space, trimming both ends.
pub fn normalize_key(text: &str) -> String {
    NON_WORD
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}

// Unicode \w keeps combining marks, so Devanagari virama and nukta stay
// inside their word
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\W_]+").unwrap());

/// Token index for one entity type
#[derive(Debug, Clone)]
pub struct TokenIndex<Id> {
    entries: HashMap<String, IndexEntry<Id>>,
    max_words: usize,
}

impl<Id> Default for TokenIndex<Id> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            max_words: 0,
        }
    }
}

impl<Id: Clone + Eq + Hash + std::fmt::Debug> TokenIndex<Id> {
    fn from_registrations(label: &str, registrations: HashMap<String, Vec<(Id, MatchKind)>>) -> Self {
        let mut entries = HashMap::new();
        let mut max_words = 0;

        for (key, claims) in registrations {
            let Some(best) = claims.iter().map(|(_, kind)| *kind).max() else {
                continue;
            };
            // Phrase claims shadow single-word ones; among single-word
            // claims every kind counts toward ambiguity.
            let contenders: Vec<&(Id, MatchKind)> = if best.is_phrase() {
                claims.iter().filter(|(_, kind)| *kind == best).collect()
            } else {
                claims.iter().collect()
            };

            let first = &contenders[0].0;
            if contenders.iter().any(|(id, _)| id != first) {
                tracing::debug!(index = label, key = %key, "Dropping ambiguous index key");
                continue;
            }

            let words = key.split(' ').count();
            max_words = max_words.max(words);
            entries.insert(
                key,
                IndexEntry {
                    id: first.clone(),
                    kind: best,
                    words,
                },
            );
        }

        Self { entries, max_words }
    }

    pub fn get(&self, key: &str) -> Option<&IndexEntry<Id>> {
        self.entries.get(key)
    }

    /// Keys that identify an entity on their own (full names and aliases)
    pub fn phrases(&self) -> impl Iterator<Item = (&str, &IndexEntry<Id>)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.kind.is_phrase())
            .map(|(k, e)| (k.as_str(), e))
    }

    /// Longest key, in words
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Product and country indexes built from one store
#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    pub products: TokenIndex<ProductId>,
    pub countries: TokenIndex<CountryId>,
}

impl LexicalIndex {
    /// Build both indexes. Words of a multi-word name are registered only
    /// when longer than `min_subword_len` characters.
    pub fn build(kb: &KnowledgeBase, lexicons: &LexiconConfig, min_subword_len: usize) -> Self {
        let mut products: HashMap<String, Vec<(ProductId, MatchKind)>> = HashMap::new();
        for product in kb.products() {
            register_name(&mut products, &product.id, &product.name, min_subword_len);
            for alias in &product.aliases {
                register(&mut products, alias, &product.id, MatchKind::Alias);
            }
            register(&mut products, &product.category, &product.id, MatchKind::Category);
        }

        let mut countries: HashMap<String, Vec<(CountryId, MatchKind)>> = HashMap::new();
        for country in kb.countries() {
            register_name(&mut countries, &country.id, &country.name, min_subword_len);
            for alias in country
                .aliases
                .iter()
                .chain(lexicons.aliases_for(country.id.as_str()))
            {
                register(&mut countries, alias, &country.id, MatchKind::Alias);
            }
        }

        for id in lexicons.country_aliases.keys() {
            if kb.country_by_key(id).is_none() {
                tracing::warn!(country = %id, "Curated alias table names an unknown country");
            }
        }

        let index = Self {
            products: TokenIndex::from_registrations("products", products),
            countries: TokenIndex::from_registrations("countries", countries),
        };

        tracing::debug!(
            product_keys = index.products.len(),
            country_keys = index.countries.len(),
            "Lexical index built"
        );

        index
    }
}

fn register<Id: Clone>(
    table: &mut HashMap<String, Vec<(Id, MatchKind)>>,
    text: &str,
    id: &Id,
    kind: MatchKind,
) {
    let key = normalize_key(text);
    if key.is_empty() {
        return;
    }
    table.entry(key).or_default().push((id.clone(), kind));
}

fn register_name<Id: Clone>(
    table: &mut HashMap<String, Vec<(Id, MatchKind)>>,
    id: &Id,
    name: &str,
    min_subword_len: usize,
) {
    register(table, name, id, MatchKind::FullName);

    let key = normalize_key(name);
    let words: Vec<&str> = key.split(' ').collect();
    if words.len() > 1 {
        for word in words {
            if word.chars().count() > min_subword_len {
                register(table, word, id, MatchKind::SubWord);
            }
        }
    }
}
