//! Raw knowledge dataset as loaded from YAML
//!
//! This is the serialized form only. Cross-reference validation and
//! indexing happen when the knowledge base is built from it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use trade_query_core::{
    Country, DocumentRequirementRecord, Product, ProfitAnalysisRecord, RiskFactorRecord,
    TariffRecord,
};

use crate::{parse_builtin, read_data_file, ConfigError};

const BUILTIN_DATASET: &str = include_str!("../data/knowledge_base.yaml");

/// Every collection the knowledge base is built from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeDataset {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub countries: Vec<Country>,
    #[serde(default)]
    pub tariffs: Vec<TariffRecord>,
    #[serde(default)]
    pub documents: Vec<DocumentRequirementRecord>,
    #[serde(default)]
    pub profit: Vec<ProfitAnalysisRecord>,
    #[serde(default)]
    pub risk: Vec<RiskFactorRecord>,
}

impl KnowledgeDataset {
    /// The dataset shipped with the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        parse_builtin("knowledge dataset", BUILTIN_DATASET)
    }

    /// Load from a YAML or JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let dataset: Self = read_data_file(path.as_ref())?;
        tracing::info!(
            path = %path.as_ref().display(),
            products = dataset.products.len(),
            countries = dataset.countries.len(),
            tariffs = dataset.tariffs.len(),
            "Loaded knowledge dataset"
        );
        Ok(dataset)
    }

    /// Load from `path` if given, otherwise use the built-in dataset
    pub fn load_or_builtin(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_dataset_parses() {
        let dataset = KnowledgeDataset::builtin().unwrap();
        assert!(!dataset.products.is_empty());
        assert!(!dataset.countries.is_empty());
        assert!(dataset.products.iter().any(|p| p.id.as_str() == "tea"));
        assert!(dataset
            .tariffs
            .iter()
            .any(|t| t.product.as_str() == "tea" && t.hs_code == "0902.30"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
products:
  - id: coffee
    name: Coffee
    category: beverages
    hs_code: "0901.21"
    risk_level: low
    average_tariff: 2.0
    demand_level: high
"#
        )
        .unwrap();

        let dataset = KnowledgeDataset::load(file.path()).unwrap();
        assert_eq!(dataset.products.len(), 1);
        assert!(dataset.countries.is_empty());
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"countries": []}}"#).unwrap();
        let dataset = KnowledgeDataset::load(file.path()).unwrap();
        assert!(dataset.countries.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let result = KnowledgeDataset::load("/nonexistent/dataset.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
