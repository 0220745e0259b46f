//! Response synthesis
//!
//! Renders a [`Resolution`] into text using the template table for the
//! resolved language, falling back to English per template and phrase.

use std::sync::Arc;

use trade_query_config::{fill, Phrase, TemplateId, TemplateTable};
use trade_query_core::{Country, Language, Level, Product, QueryIntent, RiskDimension, Slot};
use trade_query_knowledge::KnowledgeBase;

use crate::resolver::{Resolution, RiskAssessment};

/// Format a percentage with at most two decimals and no trailing zeros
pub fn format_rate(rate: f64) -> String {
    let formatted = format!("{:.2}", rate);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Template-driven response renderer
#[derive(Debug, Clone)]
pub struct ResponseSynthesizer {
    templates: Arc<TemplateTable>,
    kb: Arc<KnowledgeBase>,
}

impl ResponseSynthesizer {
    pub fn new(templates: Arc<TemplateTable>, kb: Arc<KnowledgeBase>) -> Self {
        Self { templates, kb }
    }

    pub fn render(&self, resolution: &Resolution<'_>, language: Language) -> String {
        let t = Renderer {
            templates: &self.templates,
            kb: &self.kb,
            language,
        };

        match resolution {
            Resolution::Tariff {
                product,
                origin,
                destination,
                record,
            } => {
                let documents = t.list_or_none(&record.required_documents, ", ");
                let restrictions = t.list_or_none(&record.restrictions, "; ");
                t.fill(
                    TemplateId::TariffExact,
                    &[
                        ("product", product.display_name(language)),
                        ("origin", origin.display_name(language)),
                        ("destination", destination.display_name(language)),
                        ("hs_code", &record.hs_code),
                        ("base_rate", &format_rate(record.base_rate)),
                        ("additional_duties", &format_rate(record.additional_duties)),
                        ("total_rate", &format_rate(record.total_rate())),
                        ("documents", &documents),
                        ("restrictions", &restrictions),
                    ],
                )
            }

            Resolution::Documents {
                product,
                origin,
                destination,
                record,
            } => {
                let documents = record
                    .documents
                    .iter()
                    .map(|doc| {
                        let flag = if doc.required {
                            t.phrase(Phrase::Required)
                        } else {
                            t.phrase(Phrase::Optional)
                        };
                        if doc.description.is_empty() {
                            format!("- {} ({})", doc.name, flag)
                        } else {
                            format!("- {} ({}): {}", doc.name, flag, doc.description)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                let notes = t.list_or_none(&record.special_notes, "; ");
                t.fill(
                    TemplateId::DocumentExact,
                    &[
                        ("product", product.display_name(language)),
                        ("origin", origin.display_name(language)),
                        ("destination", destination.display_name(language)),
                        ("documents", &documents),
                        ("notes", &notes),
                    ],
                )
            }

            Resolution::Profit {
                destination,
                record,
            } => {
                let products = record
                    .products
                    .iter()
                    .map(|entry| {
                        let name = t
                            .kb
                            .product(&entry.product)
                            .map(|p| p.display_name(t.language))
                            .unwrap_or(entry.product.as_str());
                        let mut line = format!(
                            "- {}: {}-{}% {}, {}: {}, {}: {}",
                            name,
                            format_rate(entry.margin.min),
                            format_rate(entry.margin.max),
                            t.phrase(Phrase::Margin),
                            t.phrase(Phrase::Demand),
                            t.level(entry.demand),
                            t.phrase(Phrase::Competition),
                            t.level(entry.competition),
                        );
                        if !entry.success_factors.is_empty() {
                            line.push_str(&format!(" ({})", entry.success_factors.join(", ")));
                        }
                        line
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                let insights = t.list_or_none(&record.insights, "; ");
                t.fill(
                    TemplateId::ProfitExact,
                    &[
                        ("destination", destination.display_name(language)),
                        ("market_size", &record.market_size),
                        ("currency", &record.currency),
                        ("products", &products),
                        ("insights", &insights),
                    ],
                )
            }

            Resolution::Risk(assessment) => t.risk(assessment),

            Resolution::NeedsSlots { intent, missing } => {
                let names: Vec<&str> = missing.iter().map(|slot| t.slot(*slot)).collect();
                let missing = t.join_and(&names);
                t.fill(
                    TemplateId::Clarify,
                    &[("intent", t.intent(*intent)), ("missing", &missing)],
                )
            }

            Resolution::NoMatch {
                intent,
                product,
                origin,
                destination,
            } => t.no_match(*intent, *product, *origin, *destination),

            Resolution::General => t.fill(TemplateId::General, &[]),
        }
    }
}

/// Per-call rendering helpers bound to one language
struct Renderer<'a> {
    templates: &'a TemplateTable,
    kb: &'a KnowledgeBase,
    language: Language,
}

impl Renderer<'_> {
    fn fill(&self, id: TemplateId, values: &[(&str, &str)]) -> String {
        fill(self.templates.template(self.language, id), values)
    }

    fn phrase(&self, phrase: Phrase) -> &str {
        self.templates.phrase(self.language, phrase)
    }

    fn level(&self, level: Level) -> &str {
        self.phrase(match level {
            Level::Low => Phrase::Low,
            Level::Medium => Phrase::Medium,
            Level::High => Phrase::High,
        })
    }

    fn slot(&self, slot: Slot) -> &str {
        self.phrase(match slot {
            Slot::Product => Phrase::Product,
            Slot::Origin => Phrase::Origin,
            Slot::Destination => Phrase::Destination,
        })
    }

    fn intent(&self, intent: QueryIntent) -> &str {
        self.phrase(match intent {
            QueryIntent::Tariff => Phrase::IntentTariff,
            QueryIntent::Document => Phrase::IntentDocument,
            QueryIntent::Profit => Phrase::IntentProfit,
            QueryIntent::Risk => Phrase::IntentRisk,
            QueryIntent::General => Phrase::IntentGeneral,
        })
    }

    fn dimension(&self, dimension: RiskDimension) -> &str {
        self.phrase(match dimension {
            RiskDimension::Political => Phrase::Political,
            RiskDimension::Economic => Phrase::Economic,
            RiskDimension::Tariff => Phrase::Tariff,
            RiskDimension::Compliance => Phrase::Compliance,
            RiskDimension::Market => Phrase::Market,
        })
    }

    fn list_or_none(&self, items: &[String], separator: &str) -> String {
        if items.is_empty() {
            self.phrase(Phrase::None).to_string()
        } else {
            items.join(separator)
        }
    }

    /// "a", "a and b", "a, b and c"
    fn join_and(&self, items: &[&str]) -> String {
        match items {
            [] => String::new(),
            [only] => only.to_string(),
            [head @ .., last] => {
                format!("{} {} {}", head.join(", "), self.phrase(Phrase::And), last)
            }
        }
    }

    fn risk(&self, assessment: &RiskAssessment<'_>) -> String {
        let scores = assessment
            .factors
            .scores()
            .into_iter()
            .map(|(dimension, score)| format!("- {}: {}/100", self.dimension(dimension), score))
            .collect::<Vec<_>>()
            .join("\n");
        self.fill(
            TemplateId::RiskExact,
            &[
                ("product", assessment.product.display_name(self.language)),
                ("destination", assessment.destination.display_name(self.language)),
                ("overall", self.level(assessment.overall)),
                ("product_risk", self.level(assessment.product.risk_level)),
                ("country_risk", self.level(assessment.destination.risk_level)),
                ("scores", &scores),
                ("average", &assessment.factors.average().to_string()),
            ],
        )
    }

    /// General guidance without any figures
    fn no_match(
        &self,
        intent: QueryIntent,
        product: Option<&Product>,
        origin: Option<&Country>,
        destination: Option<&Country>,
    ) -> String {
        let product = product
            .map(|p| p.display_name(self.language))
            .unwrap_or_else(|| self.phrase(Phrase::Product));
        let origin = origin
            .map(|c| c.display_name(self.language))
            .unwrap_or_else(|| self.phrase(Phrase::Origin));
        let destination = destination
            .map(|c| c.display_name(self.language))
            .unwrap_or_else(|| self.phrase(Phrase::Destination));

        let id = match intent {
            QueryIntent::Tariff => TemplateId::TariffNoMatch,
            QueryIntent::Document => TemplateId::DocumentNoMatch,
            QueryIntent::Profit => TemplateId::ProfitNoMatch,
            QueryIntent::Risk => TemplateId::RiskNoMatch,
            QueryIntent::General => TemplateId::General,
        };

        self.fill(
            id,
            &[
                ("product", product),
                ("origin", origin),
                ("destination", destination),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trade_query_core::{CountryId, ProductId};

    fn synthesizer() -> (ResponseSynthesizer, Arc<KnowledgeBase>) {
        let kb = Arc::new(KnowledgeBase::builtin().unwrap());
        let templates = Arc::new(TemplateTable::builtin().unwrap());
        (ResponseSynthesizer::new(templates, kb.clone()), kb)
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(6.4), "6.4");
        assert_eq!(format_rate(6.40), "6.4");
        assert_eq!(format_rate(0.0), "0");
        assert_eq!(format_rate(25.0), "25");
        assert_eq!(format_rate(3.14159), "3.14");
        assert_eq!(format_rate(12.5), "12.5");
    }

    #[test]
    fn test_tariff_text() {
        let (synth, kb) = synthesizer();
        let tea = ProductId::from("tea");
        let india = CountryId::from("india");
        let usa = CountryId::from("usa");
        let resolution = Resolution::Tariff {
            product: kb.product(&tea).unwrap(),
            origin: kb.country(&india).unwrap(),
            destination: kb.country(&usa).unwrap(),
            record: kb.tariff_for(&tea, &india, &usa).unwrap(),
        };
        let text = synth.render(&resolution, Language::English);
        assert!(text.contains("0902.30"));
        assert!(text.contains("6.4%"));
        assert!(text.contains("Tea from India to United States"));
        assert!(text.contains("FDA Prior Notice"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn test_clarify_names_missing_slots() {
        let (synth, _) = synthesizer();
        let resolution = Resolution::NeedsSlots {
            intent: QueryIntent::Document,
            missing: vec![Slot::Origin, Slot::Destination],
        };
        let text = synth.render(&resolution, Language::English);
        assert!(text.contains("the origin country and the destination country"));
        assert!(text.contains("document"));

        let spanish = synth.render(&resolution, Language::Spanish);
        assert!(spanish.contains("el país de origen y el país de destino"));
    }

    #[test]
    fn test_no_match_has_no_figures() {
        let (synth, kb) = synthesizer();
        for intent in [
            QueryIntent::Tariff,
            QueryIntent::Document,
            QueryIntent::Profit,
            QueryIntent::Risk,
        ] {
            let resolution = Resolution::NoMatch {
                intent,
                product: kb.product(&"coffee".into()),
                origin: kb.country(&"india".into()),
                destination: kb.country(&"japan".into()),
            };
            for language in Language::all() {
                let text = synth.render(&resolution, *language);
                assert!(
                    !text.chars().any(|c| c.is_ascii_digit()),
                    "{} {}: {}",
                    intent,
                    language,
                    text
                );
                assert!(!text.contains('{'));
            }
        }
    }

    #[test]
    fn test_partial_localization_falls_back() {
        let (synth, kb) = synthesizer();
        let tea = ProductId::from("tea");
        let russia = CountryId::from("russia");
        let resolution = Resolution::Risk(RiskAssessment::new(
            kb.product(&tea).unwrap(),
            kb.country(&russia).unwrap(),
            kb.risk_for(&russia).unwrap(),
        ));
        let hindi = synth.render(&resolution, Language::Hindi);
        let english = synth.render(&resolution, Language::English);
        assert_eq!(hindi, english);
        assert!(english.contains("HIGH overall risk"));
        assert!(english.contains("Political: 90/100"));
    }

    #[test]
    fn test_profit_lists_products() {
        let (synth, kb) = synthesizer();
        let germany = CountryId::from("germany");
        let resolution = Resolution::Profit {
            destination: kb.country(&germany).unwrap(),
            record: kb.profit_for(&germany).unwrap(),
        };
        let text = synth.render(&resolution, Language::German);
        assert!(text.contains("Gewinnaussichten für Deutschland"));
        assert!(text.contains("- Lederwaren: 20-40% Marge"));
    }

    #[test]
    fn test_localized_entity_names() {
        let (synth, kb) = synthesizer();
        let tea = ProductId::from("tea");
        let india = CountryId::from("india");
        let usa = CountryId::from("usa");
        let resolution = Resolution::Tariff {
            product: kb.product(&tea).unwrap(),
            origin: kb.country(&india).unwrap(),
            destination: kb.country(&usa).unwrap(),
            record: kb.tariff_for(&tea, &india, &usa).unwrap(),
        };
        let french = synth.render(&resolution, Language::French);
        assert!(french.contains("Thé"), "{}", french);
        assert!(french.contains("Inde"), "{}", french);
        assert!(french.contains("États-Unis"), "{}", french);
        assert!(!french.contains("United States"));

        let hindi = synth.render(&resolution, Language::Hindi);
        assert!(hindi.contains("United States"));
    }
}
