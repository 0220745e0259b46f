//! Trade query engine
//!
//! Ties the pipeline together:
//!
//! ```text
//! message -> language -> entities -> intent -> resolution -> text
//! ```
//!
//! The knowledge base and lexical index are built once and shared; every
//! call to [`TradeQueryEngine::interpret`] is a pure function of its input.
//!
//! # Example
//!
//! ```ignore
//! use trade_query_engine::TradeQueryEngine;
//!
//! let engine = TradeQueryEngine::builtin()?;
//! let response = engine.interpret("What is the tariff for tea from India to USA?", None)?;
//! assert!(response.text.contains("0902.30"));
//! ```

pub mod engine;
pub mod resolver;
pub mod synthesizer;

pub use engine::TradeQueryEngine;
pub use resolver::{KnowledgeResolver, Resolution, RiskAssessment};
pub use synthesizer::{format_rate, ResponseSynthesizer};

pub use trade_query_core::{Error, InterpretRequest, InterpretResponse, Outcome, Result};
