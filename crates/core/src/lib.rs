//! Core types for the trade query engine
//!
//! This crate provides the vocabulary shared by every other crate:
//! - Supported languages
//! - Query intents and slots
//! - Knowledge base entities and records
//! - The request/response pair exposed by the engine
//! - Error types

pub mod entities;
pub mod error;
pub mod intent;
pub mod language;
pub mod records;
pub mod response;

pub use entities::{Country, CountryId, Level, Product, ProductId};
pub use error::{Error, Result};
pub use intent::{QueryIntent, Slot};
pub use language::Language;
pub use records::{
    DocumentRequirement, DocumentRequirementRecord, MarginRange, ProfitAnalysisRecord,
    ProfitProductEntry, RiskDimension, RiskFactorRecord, TariffRecord,
};
pub use response::{InterpretRequest, InterpretResponse, Outcome};
