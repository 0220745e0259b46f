//! Knowledge base records keyed by trade lane or market

use serde::{Deserialize, Serialize};

use crate::entities::{CountryId, Level, ProductId};

/// Import duty for one (product, origin, destination) lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRecord {
    pub product: ProductId,
    pub origin: CountryId,
    pub destination: CountryId,
    pub hs_code: String,
    /// Base rate in percent
    pub base_rate: f64,
    /// Anti-dumping, countervailing and similar duties in percent
    #[serde(default)]
    pub additional_duties: f64,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub restrictions: Vec<String>,
}

impl TariffRecord {
    /// Total applied duty in percent
    pub fn total_rate(&self) -> f64 {
        self.base_rate + self.additional_duties
    }
}

/// A single document in a requirement list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequirement {
    pub name: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

fn default_required() -> bool {
    true
}

/// Ordered paperwork list for one (product, origin, destination) lane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequirementRecord {
    pub product: ProductId,
    pub origin: CountryId,
    pub destination: CountryId,
    pub documents: Vec<DocumentRequirement>,
    #[serde(default)]
    pub special_notes: Vec<String>,
}

impl DocumentRequirementRecord {
    pub fn required(&self) -> impl Iterator<Item = &DocumentRequirement> {
        self.documents.iter().filter(|d| d.required)
    }

    pub fn optional(&self) -> impl Iterator<Item = &DocumentRequirement> {
        self.documents.iter().filter(|d| !d.required)
    }
}

/// Profit margin range in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginRange {
    pub min: f64,
    pub max: f64,
}

/// One ranked product in a market's profit analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitProductEntry {
    pub product: ProductId,
    pub margin: MarginRange,
    pub demand: Level,
    pub competition: Level,
    #[serde(default)]
    pub success_factors: Vec<String>,
}

/// Market outlook for a destination country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitAnalysisRecord {
    pub country: CountryId,
    pub currency: String,
    pub market_size: String,
    /// Best opportunity first
    pub products: Vec<ProfitProductEntry>,
    #[serde(default)]
    pub insights: Vec<String>,
}

impl ProfitAnalysisRecord {
    pub fn entry_for(&self, product: &ProductId) -> Option<&ProfitProductEntry> {
        self.products.iter().find(|p| &p.product == product)
    }
}

/// Named risk dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskDimension {
    Political,
    Economic,
    Tariff,
    Compliance,
    Market,
}

impl RiskDimension {
    pub fn all() -> &'static [RiskDimension] {
        &[
            Self::Political,
            Self::Economic,
            Self::Tariff,
            Self::Compliance,
            Self::Market,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Political => "political",
            Self::Economic => "economic",
            Self::Tariff => "tariff",
            Self::Compliance => "compliance",
            Self::Market => "market",
        }
    }
}

/// Country risk scores, each 0-100 (higher is riskier)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactorRecord {
    pub country: CountryId,
    pub political: u8,
    pub economic: u8,
    pub tariff: u8,
    pub compliance: u8,
    pub market: u8,
}

impl RiskFactorRecord {
    pub fn score(&self, dimension: RiskDimension) -> u8 {
        match dimension {
            RiskDimension::Political => self.political,
            RiskDimension::Economic => self.economic,
            RiskDimension::Tariff => self.tariff,
            RiskDimension::Compliance => self.compliance,
            RiskDimension::Market => self.market,
        }
    }

    /// Dimensions paired with their scores, in declaration order
    pub fn scores(&self) -> Vec<(RiskDimension, u8)> {
        RiskDimension::all()
            .iter()
            .map(|d| (*d, self.score(*d)))
            .collect()
    }

    /// Mean score across all dimensions, rounded down
    pub fn average(&self) -> u8 {
        let sum: u32 = self.scores().iter().map(|(_, s)| *s as u32).sum();
        (sum / RiskDimension::all().len() as u32) as u8
    }
}
