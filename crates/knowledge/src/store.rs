//! Immutable knowledge base store

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use trade_query_config::{ConfigError, KnowledgeDataset};
use trade_query_core::{
    Country, CountryId, DocumentRequirementRecord, Product, ProductId, ProfitAnalysisRecord,
    RiskFactorRecord, TariffRecord,
};

use crate::index::normalize_key;

/// Dataset problems found while building the store
#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Duplicate {kind} record for {key}")]
    DuplicateRecord { kind: &'static str, key: String },

    #[error("{record} refers to unknown {field} '{id}'")]
    UnknownReference {
        record: &'static str,
        field: &'static str,
        id: String,
    },

    #[error("Negative total tariff {total} for {key}")]
    NegativeTariff { key: String, total: f64 },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Failed to load dataset: {0}")]
    Load(#[from] ConfigError),
}

impl From<KnowledgeError> for trade_query_core::Error {
    fn from(err: KnowledgeError) -> Self {
        trade_query_core::Error::Knowledge(err.to_string())
    }
}

type LaneKey = (ProductId, CountryId, CountryId);

/// Record counts, for logging and health checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct KnowledgeStats {
    pub products: usize,
    pub countries: usize,
    pub tariffs: usize,
    pub documents: usize,
    pub profit: usize,
    pub risk: usize,
}

/// Read-only reference data
///
/// Every accessor returns `None` when there is no record for the exact key.
/// The store is never mutated after construction, so a shared reference
/// can be read from any number of threads.
#[derive(Debug)]
pub struct KnowledgeBase {
    products: Vec<Product>,
    countries: Vec<Country>,
    product_keys: HashMap<String, usize>,
    country_keys: HashMap<String, usize>,
    tariffs: Vec<TariffRecord>,
    tariff_lanes: HashMap<LaneKey, usize>,
    documents: Vec<DocumentRequirementRecord>,
    document_lanes: HashMap<LaneKey, usize>,
    profit: HashMap<CountryId, ProfitAnalysisRecord>,
    risk: HashMap<CountryId, RiskFactorRecord>,
}

impl KnowledgeBase {
    /// Build from the dataset embedded in the binary
    pub fn builtin() -> Result<Self, KnowledgeError> {
        Self::from_dataset(KnowledgeDataset::builtin()?)
    }

    /// Load a dataset file, or the built-in one when `path` is `None`
    pub fn load(path: Option<&str>) -> Result<Self, KnowledgeError> {
        Self::from_dataset(KnowledgeDataset::load_or_builtin(path)?)
    }

    /// Validate a dataset and build the store from it
    pub fn from_dataset(dataset: KnowledgeDataset) -> Result<Self, KnowledgeError> {
        let KnowledgeDataset {
            products,
            countries,
            tariffs,
            documents,
            profit,
            risk,
        } = dataset;

        let product_ids = unique_ids("product", products.iter().map(|p| p.id.as_str()))?;
        let country_ids = unique_ids("country", countries.iter().map(|c| c.id.as_str()))?;

        for country in &countries {
            if country.ease_of_business > 100 {
                return Err(KnowledgeError::InvalidValue {
                    field: format!("countries.{}.ease_of_business", country.id),
                    message: format!("must be 0-100, got {}", country.ease_of_business),
                });
            }
        }

        let check_product = |record: &'static str, id: &ProductId| {
            if product_ids.contains(id.as_str()) {
                Ok(())
            } else {
                Err(KnowledgeError::UnknownReference {
                    record,
                    field: "product",
                    id: id.to_string(),
                })
            }
        };
        let check_country = |record: &'static str, field: &'static str, id: &CountryId| {
            if country_ids.contains(id.as_str()) {
                Ok(())
            } else {
                Err(KnowledgeError::UnknownReference {
                    record,
                    field,
                    id: id.to_string(),
                })
            }
        };

        let mut tariff_lanes = HashMap::new();
        for (i, tariff) in tariffs.iter().enumerate() {
            check_product("tariff", &tariff.product)?;
            check_country("tariff", "origin", &tariff.origin)?;
            check_country("tariff", "destination", &tariff.destination)?;

            let key = lane_key(&tariff.product, &tariff.origin, &tariff.destination);
            let total = tariff.total_rate();
            if total < 0.0 || !total.is_finite() {
                return Err(KnowledgeError::NegativeTariff {
                    key: describe_lane(&key),
                    total,
                });
            }
            if tariff_lanes.insert(key.clone(), i).is_some() {
                return Err(KnowledgeError::DuplicateRecord {
                    kind: "tariff",
                    key: describe_lane(&key),
                });
            }
        }

        let mut document_lanes = HashMap::new();
        for (i, record) in documents.iter().enumerate() {
            check_product("documents", &record.product)?;
            check_country("documents", "origin", &record.origin)?;
            check_country("documents", "destination", &record.destination)?;

            let key = lane_key(&record.product, &record.origin, &record.destination);
            if document_lanes.insert(key.clone(), i).is_some() {
                return Err(KnowledgeError::DuplicateRecord {
                    kind: "documents",
                    key: describe_lane(&key),
                });
            }
        }

        let mut profit_by_country = HashMap::new();
        for record in profit {
            check_country("profit", "country", &record.country)?;
            for entry in &record.products {
                check_product("profit", &entry.product)?;
                if entry.margin.min > entry.margin.max {
                    return Err(KnowledgeError::InvalidValue {
                        field: format!("profit.{}.{}.margin", record.country, entry.product),
                        message: "min exceeds max".to_string(),
                    });
                }
            }
            let key = record.country.clone();
            if profit_by_country.insert(key.clone(), record).is_some() {
                return Err(KnowledgeError::DuplicateRecord {
                    kind: "profit",
                    key: key.to_string(),
                });
            }
        }

        let mut risk_by_country = HashMap::new();
        for record in risk {
            check_country("risk", "country", &record.country)?;
            for (dimension, score) in record.scores() {
                if score > 100 {
                    return Err(KnowledgeError::InvalidValue {
                        field: format!("risk.{}.{}", record.country, dimension.as_str()),
                        message: format!("score must be 0-100, got {}", score),
                    });
                }
            }
            let key = record.country.clone();
            if risk_by_country.insert(key.clone(), record).is_some() {
                return Err(KnowledgeError::DuplicateRecord {
                    kind: "risk",
                    key: key.to_string(),
                });
            }
        }

        let product_keys = key_table(
            products
                .iter()
                .map(|p| (p.id.as_str(), p.name.as_str(), p.aliases.as_slice())),
        );
        let country_keys = key_table(
            countries
                .iter()
                .map(|c| (c.id.as_str(), c.name.as_str(), c.aliases.as_slice())),
        );

        let kb = Self {
            products,
            countries,
            product_keys,
            country_keys,
            tariffs,
            tariff_lanes,
            documents,
            document_lanes,
            profit: profit_by_country,
            risk: risk_by_country,
        };

        let stats = kb.stats();
        tracing::info!(
            products = stats.products,
            countries = stats.countries,
            tariffs = stats.tariffs,
            documents = stats.documents,
            profit = stats.profit,
            risk = stats.risk,
            "Knowledge base built"
        );

        Ok(kb)
    }

    /// Look up a product by id, name or alias (case-insensitive)
    pub fn product_by_key(&self, key: &str) -> Option<&Product> {
        self.product_keys
            .get(&normalize_key(key))
            .map(|&i| &self.products[i])
    }

    /// Look up a country by id, name or alias (case-insensitive)
    pub fn country_by_key(&self, key: &str) -> Option<&Country> {
        self.country_keys
            .get(&normalize_key(key))
            .map(|&i| &self.countries[i])
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.product_by_key(id.as_str())
    }

    pub fn country(&self, id: &CountryId) -> Option<&Country> {
        self.country_by_key(id.as_str())
    }

    pub fn tariff_for(
        &self,
        product: &ProductId,
        origin: &CountryId,
        destination: &CountryId,
    ) -> Option<&TariffRecord> {
        self.tariff_lanes
            .get(&lane_key(product, origin, destination))
            .map(|&i| &self.tariffs[i])
    }

    /// First tariff record, in dataset order, for a product into a destination
    pub fn tariff_to(&self, product: &ProductId, destination: &CountryId) -> Option<&TariffRecord> {
        self.tariffs
            .iter()
            .find(|t| &t.product == product && &t.destination == destination)
    }

    pub fn documents_for(
        &self,
        product: &ProductId,
        origin: &CountryId,
        destination: &CountryId,
    ) -> Option<&DocumentRequirementRecord> {
        self.document_lanes
            .get(&lane_key(product, origin, destination))
            .map(|&i| &self.documents[i])
    }

    pub fn profit_for(&self, country: &CountryId) -> Option<&ProfitAnalysisRecord> {
        self.profit.get(country)
    }

    pub fn risk_for(&self, country: &CountryId) -> Option<&RiskFactorRecord> {
        self.risk.get(country)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.countries.iter()
    }

    pub fn stats(&self) -> KnowledgeStats {
        KnowledgeStats {
            products: self.products.len(),
            countries: self.countries.len(),
            tariffs: self.tariffs.len(),
            documents: self.documents.len(),
            profit: self.profit.len(),
            risk: self.risk.len(),
        }
    }
}

fn lane_key(product: &ProductId, origin: &CountryId, destination: &CountryId) -> LaneKey {
    (product.clone(), origin.clone(), destination.clone())
}

fn describe_lane((product, origin, destination): &LaneKey) -> String {
    format!("{} {} -> {}", product, origin, destination)
}

fn unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, KnowledgeError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(KnowledgeError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(seen)
}

/// Map of normalized id, name and aliases to position. The first entity to
/// claim a key keeps it.
fn key_table<'a>(
    entities: impl Iterator<Item = (&'a str, &'a str, &'a [String])>,
) -> HashMap<String, usize> {
    let mut table = HashMap::new();
    for (i, (id, name, aliases)) in entities.enumerate() {
        table.insert(normalize_key(id), i);
        table.entry(normalize_key(name)).or_insert(i);
        for alias in aliases {
            table.entry(normalize_key(alias)).or_insert(i);
        }
    }
    table
}
