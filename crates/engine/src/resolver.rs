//! Knowledge resolution
//!
//! Maps an intent and the extracted entities to a knowledge base record.
//! Missing slots short-circuit before any lookup; a lookup with every slot
//! filled that finds nothing is a no-match, not an error.

use std::sync::Arc;

use trade_query_core::{
    Country, DocumentRequirementRecord, Level, Outcome, Product, ProfitAnalysisRecord,
    QueryIntent, RiskFactorRecord, Slot, TariffRecord,
};
use trade_query_knowledge::KnowledgeBase;
use trade_query_text_processing::ExtractedEntities;

/// Product and market risk combined
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment<'a> {
    pub product: &'a Product,
    pub destination: &'a Country,
    pub factors: &'a RiskFactorRecord,
    /// HIGH if either side is HIGH, else MEDIUM if either is MEDIUM, else LOW
    pub overall: Level,
}

impl<'a> RiskAssessment<'a> {
    pub fn new(product: &'a Product, destination: &'a Country, factors: &'a RiskFactorRecord) -> Self {
        Self {
            product,
            destination,
            factors,
            overall: product.risk_level.combine(destination.risk_level),
        }
    }
}

/// What the resolver found
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Tariff {
        product: &'a Product,
        /// Origin of the record, which may not have been named in the message
        origin: &'a Country,
        destination: &'a Country,
        record: &'a TariffRecord,
    },
    Documents {
        product: &'a Product,
        origin: &'a Country,
        destination: &'a Country,
        record: &'a DocumentRequirementRecord,
    },
    Profit {
        destination: &'a Country,
        record: &'a ProfitAnalysisRecord,
    },
    Risk(RiskAssessment<'a>),
    /// Required slots are missing; ask for them
    NeedsSlots {
        intent: QueryIntent,
        missing: Vec<Slot>,
    },
    /// All slots were filled but there is no record
    NoMatch {
        intent: QueryIntent,
        product: Option<&'a Product>,
        origin: Option<&'a Country>,
        destination: Option<&'a Country>,
    },
    General,
}

impl Resolution<'_> {
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Tariff { .. } | Self::Documents { .. } | Self::Profit { .. } | Self::Risk(_) => {
                Outcome::Resolved
            }
            Self::NeedsSlots { .. } => Outcome::Partial,
            Self::NoMatch { .. } => Outcome::NoMatch,
            Self::General => Outcome::General,
        }
    }

    pub fn missing_slots(&self) -> &[Slot] {
        match self {
            Self::NeedsSlots { missing, .. } => missing.as_slice(),
            _ => &[],
        }
    }
}

/// Knowledge resolver
#[derive(Debug, Clone)]
pub struct KnowledgeResolver {
    kb: Arc<KnowledgeBase>,
}

/// Entities looked up in the store
struct Slots<'a> {
    product: Option<&'a Product>,
    origin: Option<&'a Country>,
    destination: Option<&'a Country>,
}

impl KnowledgeResolver {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    pub fn resolve(&self, intent: QueryIntent, entities: &ExtractedEntities) -> Resolution<'_> {
        if intent == QueryIntent::General {
            return Resolution::General;
        }

        let slots = Slots {
            product: entities.product_id().and_then(|id| self.kb.product(id)),
            origin: entities.origin_id().and_then(|id| self.kb.country(id)),
            destination: entities.destination_id().and_then(|id| self.kb.country(id)),
        };

        let missing: Vec<Slot> = intent
            .required_slots()
            .iter()
            .copied()
            .filter(|slot| match slot {
                Slot::Product => slots.product.is_none(),
                Slot::Origin => slots.origin.is_none(),
                Slot::Destination => slots.destination.is_none(),
            })
            .collect();

        if !missing.is_empty() {
            tracing::debug!(intent = %intent, ?missing, "Missing slots");
            return Resolution::NeedsSlots { intent, missing };
        }

        let resolution = match intent {
            QueryIntent::Tariff => self.resolve_tariff(&slots),
            QueryIntent::Document => self.resolve_documents(&slots),
            QueryIntent::Profit => self.resolve_profit(&slots),
            QueryIntent::Risk => self.resolve_risk(&slots),
            QueryIntent::General => Some(Resolution::General),
        };

        resolution.unwrap_or_else(|| {
            tracing::debug!(intent = %intent, "No matching record");
            Resolution::NoMatch {
                intent,
                product: slots.product,
                origin: slots.origin,
                destination: slots.destination,
            }
        })
    }

    /// Exact lane when the origin is known, otherwise the first record into
    /// the destination
    fn resolve_tariff<'a>(&'a self, slots: &Slots<'a>) -> Option<Resolution<'a>> {
        let product = slots.product?;
        let destination = slots.destination?;

        let record = match slots.origin {
            Some(origin) => self.kb.tariff_for(&product.id, &origin.id, &destination.id)?,
            None => self.kb.tariff_to(&product.id, &destination.id)?,
        };
        let origin = self.kb.country(&record.origin)?;

        Some(Resolution::Tariff {
            product,
            origin,
            destination,
            record,
        })
    }

    fn resolve_documents<'a>(&'a self, slots: &Slots<'a>) -> Option<Resolution<'a>> {
        let (product, origin, destination) = (slots.product?, slots.origin?, slots.destination?);
        let record = self
            .kb
            .documents_for(&product.id, &origin.id, &destination.id)?;
        Some(Resolution::Documents {
            product,
            origin,
            destination,
            record,
        })
    }

    fn resolve_profit<'a>(&'a self, slots: &Slots<'a>) -> Option<Resolution<'a>> {
        let destination = slots.destination?;
        let record = self.kb.profit_for(&destination.id)?;
        Some(Resolution::Profit {
            destination,
            record,
        })
    }

    fn resolve_risk<'a>(&'a self, slots: &Slots<'a>) -> Option<Resolution<'a>> {
        let (product, destination) = (slots.product?, slots.destination?);
        let factors = self.kb.risk_for(&destination.id)?;
        Some(Resolution::Risk(RiskAssessment::new(
            product,
            destination,
            factors,
        )))
    }
}
