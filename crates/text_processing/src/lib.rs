//! Text processing for trade queries
//!
//! This crate turns a raw message into structured signals:
//! - **Language Detection**: bag-of-words marker counting
//! - **Entity Extraction**: product and origin/destination countries
//! - **Intent Classification**: fixed-priority keyword sets
//!
//! # Example
//!
//! ```ignore
//! use trade_query_text_processing::{EntityExtractor, IntentClassifier, LanguageDetector};
//!
//! let language = detector.detect("What is the tariff for tea from India to USA?").language;
//! let entities = extractor.extract("What is the tariff for tea from India to USA?", language);
//! let intent = classifier.classify("What is the tariff for tea from India to USA?", language);
//! ```

pub mod entities;
pub mod intent;
pub mod language;

pub use entities::{CountryMatch, EntityExtractor, ExtractedEntities, ProductMatch, RoleSource};
pub use intent::{Classification, IntentClassifier};
pub use language::{LanguageDetection, LanguageDetector};
