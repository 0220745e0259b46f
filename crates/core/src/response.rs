//! Request and response types for the interpret operation

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{CountryId, ProductId};
use crate::error::{Error, Result};
use crate::intent::{QueryIntent, Slot};
use crate::language::Language;

/// Transport-level request
///
/// `message` is kept as a raw JSON value so that a missing, null or
/// non-string message can be reported as invalid input instead of being
/// rejected by the deserializer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterpretRequest {
    #[serde(default)]
    pub message: Option<Value>,
    /// Explicit language hint, e.g. `es` or `french`
    #[serde(default)]
    pub language: Option<String>,
}

impl InterpretRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(Value::String(message.into())),
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// The message text, if it is a string
    pub fn message_text(&self) -> Result<&str> {
        match &self.message {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(Value::Null) | None => Err(Error::invalid_input("message is missing")),
            Some(_) => Err(Error::invalid_input("message must be a string")),
        }
    }
}

/// How far the pipeline got for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A record was found and rendered
    Resolved,
    /// Required slots were missing; a clarification was rendered
    Partial,
    /// All slots were filled but no record exists
    NoMatch,
    /// General help
    General,
}

/// Result of interpreting one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretResponse {
    pub text: String,
    pub matched_intent: QueryIntent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_product: Option<ProductId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_origin: Option<CountryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_destination: Option<CountryId>,
    pub resolved_language: Language,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_slots: Vec<Slot>,
}
