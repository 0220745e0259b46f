//! The interpret pipeline

use std::sync::Arc;

use trade_query_config::{EngineConfig, LexiconConfig, Settings, TemplateTable};
use trade_query_core::{Error, InterpretRequest, InterpretResponse, Language, Result};
use trade_query_knowledge::{KnowledgeBase, LexicalIndex};
use trade_query_text_processing::{EntityExtractor, IntentClassifier, LanguageDetector};

use crate::resolver::KnowledgeResolver;
use crate::synthesizer::ResponseSynthesizer;

/// Trade query engine
///
/// Owns the immutable knowledge base, its lexical index and the pipeline
/// stages. Cheap to share behind an `Arc`; `interpret` takes `&self` and
/// never mutates anything.
#[derive(Debug, Clone)]
pub struct TradeQueryEngine {
    kb: Arc<KnowledgeBase>,
    index: Arc<LexicalIndex>,
    detector: LanguageDetector,
    extractor: EntityExtractor,
    classifier: IntentClassifier,
    resolver: KnowledgeResolver,
    synthesizer: ResponseSynthesizer,
}

impl TradeQueryEngine {
    /// Build from explicit parts, e.g. a synthetic knowledge base in tests
    pub fn new(
        kb: KnowledgeBase,
        lexicons: &LexiconConfig,
        templates: TemplateTable,
        config: &EngineConfig,
    ) -> Self {
        let kb = Arc::new(kb);
        let index = Arc::new(LexicalIndex::build(&kb, lexicons, config.min_subword_len));

        Self {
            detector: LanguageDetector::new(lexicons, config.min_language_matches),
            extractor: EntityExtractor::new(index.clone(), lexicons, config.max_window),
            classifier: IntentClassifier::new(lexicons),
            resolver: KnowledgeResolver::new(kb.clone()),
            synthesizer: ResponseSynthesizer::new(Arc::new(templates), kb.clone()),
            kb,
            index,
        }
    }

    /// Build with the embedded dataset, lexicons and templates
    pub fn builtin() -> Result<Self> {
        Self::from_settings(&Settings::default())
    }

    /// Build from settings, loading any override files they name
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let sources = &settings.knowledge;
        let kb = KnowledgeBase::load(sources.dataset_path.as_deref())?;
        let lexicons = LexiconConfig::load_or_builtin(sources.lexicon_path.as_deref())?;
        let templates = TemplateTable::load_or_builtin(sources.templates_path.as_deref())?;

        let engine = Self::new(kb, &lexicons, templates, &settings.engine);
        tracing::info!(
            product_keys = engine.index.products.len(),
            country_keys = engine.index.countries.len(),
            "Trade query engine ready"
        );
        Ok(engine)
    }

    /// Interpret one message.
    ///
    /// `hint` selects the response language explicitly; an unrecognized
    /// hint falls back to English. Only an empty message is an error; missing
    /// entities and absent records produce a normal response. Length limits
    /// belong to the transport in front of the engine.
    pub fn interpret(&self, message: &str, hint: Option<&str>) -> Result<InterpretResponse> {
        if message.trim().is_empty() {
            return Err(Error::invalid_input("message is empty"));
        }

        let language = self.resolve_language(message, hint);
        let mut entities = self.extractor.extract(message, language);
        let classification = self.classifier.classify(message, language);
        let intent = classification.intent;

        if intent.is_single_market() && entities.promote_origin_to_destination() {
            tracing::debug!(intent = %intent, "Treating the only country as the market");
        }

        let resolution = self.resolver.resolve(intent, &entities);
        let text = self.synthesizer.render(&resolution, language);

        tracing::debug!(
            language = %language,
            intent = %intent,
            keyword = ?classification.matched_keyword,
            outcome = ?resolution.outcome(),
            "Message interpreted"
        );

        Ok(InterpretResponse {
            text,
            matched_intent: intent,
            matched_product: entities.product_id().cloned(),
            matched_origin: entities.origin_id().cloned(),
            matched_destination: entities.destination_id().cloned(),
            resolved_language: language,
            outcome: resolution.outcome(),
            missing_slots: resolution.missing_slots().to_vec(),
        })
    }

    /// Interpret a transport-level request whose message may be missing or
    /// not a string
    pub fn handle(&self, request: &InterpretRequest) -> Result<InterpretResponse> {
        let message = request.message_text()?;
        self.interpret(message, request.language.as_deref())
    }

    fn resolve_language(&self, message: &str, hint: Option<&str>) -> Language {
        match hint.map(str::trim).filter(|h| !h.is_empty()) {
            Some(hint) => Language::from_str_loose(hint).unwrap_or_else(|| {
                tracing::debug!(hint, "Unsupported language hint, using English");
                Language::English
            }),
            None => self.detector.detect(message).language,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn index(&self) -> &LexicalIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trade_query_core::{Outcome, QueryIntent};

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TradeQueryEngine>();
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        let engine = TradeQueryEngine::builtin().unwrap();
        assert!(matches!(engine.interpret("", None), Err(Error::InvalidInput(_))));
        assert!(matches!(
            engine.interpret("   \n\t", None),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_long_message_is_interpreted() {
        let engine = TradeQueryEngine::builtin().unwrap();
        let message = format!(
            "What is the tariff for tea from India to USA? {}",
            "please ".repeat(300)
        );
        assert!(message.chars().count() > 2000);

        let response = engine.interpret(&message, None).unwrap();
        assert_eq!(response.matched_intent, QueryIntent::Tariff);
        assert_eq!(response.outcome, Outcome::Resolved);
        assert!(response.text.contains("0902.30"));
    }

    #[test]
    fn test_hint_resolution() {
        let engine = TradeQueryEngine::builtin().unwrap();
        assert_eq!(engine.resolve_language("tariff", Some("es")), Language::Spanish);
        assert_eq!(engine.resolve_language("tariff", Some("xx")), Language::English);
        assert_eq!(
            engine.resolve_language("¿Cuál es el arancel?", Some("  ")),
            Language::Spanish
        );
    }
}
