//! Knowledge base store and lexical indexes
//!
//! The store is built once from a [`KnowledgeDataset`], validated, and then
//! only read. The lexical index is derived from the store and can be
//! rebuilt from it at any time.
//!
//! # Example
//!
//! ```ignore
//! use trade_query_knowledge::{KnowledgeBase, LexicalIndex};
//!
//! let kb = KnowledgeBase::builtin()?;
//! let index = LexicalIndex::build(&kb, &lexicons, 3);
//! let tea = index.products.get("tea");
//! ```

pub mod index;
pub mod store;

pub use index::{normalize_key, IndexEntry, LexicalIndex, MatchKind, TokenIndex};
pub use store::{KnowledgeBase, KnowledgeError, KnowledgeStats};

pub use trade_query_config::KnowledgeDataset;
