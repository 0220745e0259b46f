//! Query intents and the entity slots they require

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    /// Import duty for a product on a trade lane
    Tariff,
    /// Paperwork required to ship a product on a trade lane
    Document,
    /// Margin and demand outlook for a destination market
    Profit,
    /// Combined product and market risk
    Risk,
    #[default]
    General,
}

impl QueryIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tariff => "tariff",
            Self::Document => "document",
            Self::Profit => "profit",
            Self::Risk => "risk",
            Self::General => "general",
        }
    }

    /// Slots that must be filled before a lookup is attempted
    pub fn required_slots(&self) -> &'static [Slot] {
        match self {
            Self::Document => &[Slot::Product, Slot::Origin, Slot::Destination],
            Self::Tariff | Self::Risk => &[Slot::Product, Slot::Destination],
            Self::Profit => &[Slot::Destination],
            Self::General => &[],
        }
    }

    /// Intents that concern a single market rather than a trade lane
    pub fn is_single_market(&self) -> bool {
        matches!(self, Self::Profit | Self::Risk)
    }

    /// Classification order, most specific first
    pub fn priority_order() -> &'static [QueryIntent] {
        &[Self::Document, Self::Profit, Self::Risk, Self::Tariff]
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A required entity position in a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Product,
    Origin,
    Destination,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Origin => "origin",
            Self::Destination => "destination",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
