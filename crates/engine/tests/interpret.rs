//! End-to-end interpretation against the built-in knowledge base

use std::io::Write;
use std::sync::Arc;
use std::thread;

use serde_json::json;
use trade_query_config::{KnowledgeDataset, Settings};
use trade_query_core::{Language, QueryIntent, Slot};
use trade_query_engine::{Error, InterpretRequest, Outcome, TradeQueryEngine};

fn engine() -> TradeQueryEngine {
    TradeQueryEngine::builtin().expect("built-in engine")
}

#[test]
fn test_tariff_exact_lane() {
    let response = engine()
        .interpret("What is the tariff for tea from India to USA?", None)
        .unwrap();

    assert_eq!(response.resolved_language, Language::English);
    assert_eq!(response.matched_intent, QueryIntent::Tariff);
    assert_eq!(response.outcome, Outcome::Resolved);
    assert_eq!(response.matched_product.as_ref().unwrap().as_str(), "tea");
    assert_eq!(response.matched_origin.as_ref().unwrap().as_str(), "india");
    assert_eq!(response.matched_destination.as_ref().unwrap().as_str(), "usa");
    assert!(response.text.contains("0902.30"));
    assert!(response.text.contains("6.4"));
    assert!(response.missing_slots.is_empty());
}

#[test]
fn test_learn_is_not_a_profit_keyword() {
    let response = engine()
        .interpret("I want to learn the tariff for tea from India to USA", None)
        .unwrap();

    assert_eq!(response.matched_intent, QueryIntent::Tariff);
    assert_eq!(response.outcome, Outcome::Resolved);
    assert!(response.text.contains("0902.30"));
}

#[test]
fn test_long_message_is_not_an_error() {
    let message = format!(
        "What is the tariff for tea from India to USA? {}",
        "please ".repeat(300)
    );
    let response = engine().interpret(&message, None).unwrap();

    assert_eq!(response.matched_intent, QueryIntent::Tariff);
    assert_eq!(response.outcome, Outcome::Resolved);
}

#[test]
fn test_answer_uses_localized_names() {
    let response = engine()
        .interpret("Wie ist der Gewinn für Lederwaren in Deutschland?", None)
        .unwrap();

    assert_eq!(response.resolved_language, Language::German);
    assert_eq!(response.matched_intent, QueryIntent::Profit);
    assert_eq!(response.outcome, Outcome::Resolved);
    assert!(response.text.contains("Deutschland"), "{}", response.text);
    assert!(response.text.contains("Lederwaren"), "{}", response.text);
    assert!(!response.text.contains("Germany"));
}

#[test]
fn test_interpret_is_deterministic() {
    let engine = engine();
    let message = "Which documents are required to export silk from India to USA?";
    let first = engine.interpret(message, None).unwrap();
    let second = engine.interpret(message, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_direction_independent_of_word_order() {
    let engine = engine();
    let forward = engine
        .interpret("tariff for silk from India to USA", None)
        .unwrap();
    let reversed = engine
        .interpret("tariff for silk to USA from India", None)
        .unwrap();

    for response in [&forward, &reversed] {
        assert_eq!(response.matched_origin.as_ref().unwrap().as_str(), "india");
        assert_eq!(response.matched_destination.as_ref().unwrap().as_str(), "usa");
    }
    assert_eq!(forward.text, reversed.text);
}

#[test]
fn test_full_name_preferred_over_subword() {
    let response = engine()
        .interpret("What is the duty on basmati rice from India to UAE?", None)
        .unwrap();
    assert_eq!(
        response.matched_product.as_ref().unwrap().as_str(),
        "basmati_rice"
    );
    assert_eq!(response.outcome, Outcome::Resolved);
}

#[test]
fn test_spanish_detection_and_response() {
    let response = engine()
        .interpret("¿Cuál es el arancel para té de India a Estados Unidos?", None)
        .unwrap();

    assert_eq!(response.resolved_language, Language::Spanish);
    assert_eq!(response.matched_intent, QueryIntent::Tariff);
    assert_eq!(response.matched_product.as_ref().unwrap().as_str(), "tea");
    assert_eq!(response.matched_origin.as_ref().unwrap().as_str(), "india");
    assert_eq!(response.matched_destination.as_ref().unwrap().as_str(), "usa");
    assert!(response.text.contains("0902.30"));
}

#[test]
fn test_too_few_markers_falls_back_to_english() {
    let response = engine().interpret("arancel tea USA", None).unwrap();
    assert_eq!(response.resolved_language, Language::English);
}

#[test]
fn test_document_query_without_countries_asks_for_them() {
    let response = engine()
        .interpret("What documents do I need to export tea?", None)
        .unwrap();

    assert_eq!(response.matched_intent, QueryIntent::Document);
    assert_eq!(response.outcome, Outcome::Partial);
    assert_eq!(response.missing_slots, vec![Slot::Origin, Slot::Destination]);
    assert!(response.text.contains("the origin country"));
    assert!(response.text.contains("the destination country"));
}

#[test]
fn test_document_query_missing_origin() {
    let response = engine()
        .interpret("Which documents are required to export tea to USA?", None)
        .unwrap();

    assert_eq!(response.outcome, Outcome::Partial);
    assert_eq!(response.missing_slots, vec![Slot::Origin]);
    assert!(response.text.contains("the origin country"));
    assert!(!response.text.contains("the destination country"));
}

#[test]
fn test_tariff_no_match_has_no_figures() {
    let response = engine()
        .interpret("What is the tariff on coffee from Brazil to Japan?", None)
        .unwrap();

    assert_eq!(response.outcome, Outcome::NoMatch);
    assert!(response.text.contains("Coffee"));
    assert!(!response.text.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn test_risk_high_country_dominates() {
    let response = engine()
        .interpret("What is the risk of exporting tea to Russia?", None)
        .unwrap();

    assert_eq!(response.matched_intent, QueryIntent::Risk);
    assert_eq!(response.outcome, Outcome::Resolved);
    assert!(response.text.contains("HIGH overall risk"));
}

#[test]
fn test_profit_single_country_is_the_market() {
    // No cue: the only country is promoted to the market
    let response = engine()
        .interpret("profit margin Germany", None)
        .unwrap();

    assert_eq!(response.matched_intent, QueryIntent::Profit);
    assert_eq!(response.outcome, Outcome::Resolved);
    assert_eq!(
        response.matched_destination.as_ref().unwrap().as_str(),
        "germany"
    );
    assert!(response.matched_origin.is_none());
}

#[test]
fn test_general_message() {
    let response = engine().interpret("hello there", None).unwrap();
    assert_eq!(response.matched_intent, QueryIntent::General);
    assert_eq!(response.outcome, Outcome::General);
    assert!(!response.text.is_empty());
}

#[test]
fn test_empty_message_is_invalid_input() {
    let engine = engine();
    assert!(matches!(engine.interpret("", None), Err(Error::InvalidInput(_))));

    let request: InterpretRequest = serde_json::from_value(json!({ "message": null })).unwrap();
    assert!(matches!(engine.handle(&request), Err(Error::InvalidInput(_))));

    let request: InterpretRequest = serde_json::from_value(json!({ "message": 42 })).unwrap();
    assert!(matches!(engine.handle(&request), Err(Error::InvalidInput(_))));
}

#[test]
fn test_handle_with_language_hint() {
    let request: InterpretRequest = serde_json::from_value(json!({
        "message": "What is the tariff for tea from India to USA?",
        "language": "de",
    }))
    .unwrap();

    let response = engine().handle(&request).unwrap();
    assert_eq!(response.resolved_language, Language::German);
    assert!(response.text.contains("0902.30"));
}

#[test]
fn test_unsupported_hint_uses_english() {
    let response = engine()
        .interpret("¿Cuál es el arancel para té de India a Estados Unidos?", Some("pt"))
        .unwrap();
    assert_eq!(response.resolved_language, Language::English);
}

#[test]
fn test_response_serializes_with_codes() {
    let response = engine()
        .interpret("What is the tariff for tea from India to USA?", None)
        .unwrap();
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["matched_intent"], "tariff");
    assert_eq!(value["resolved_language"], "en");
    assert_eq!(value["matched_product"], "tea");
    assert_eq!(value["outcome"], "resolved");
}

#[test]
fn test_concurrent_readers_agree() {
    let engine = Arc::new(engine());
    let messages = [
        "What is the tariff for tea from India to USA?",
        "What is the risk of exporting tea to Russia?",
        "Which documents are required to export silk from India to USA?",
        "¿Cuál es el arancel para té de India a Estados Unidos?",
    ];
    let expected: Vec<_> = messages
        .iter()
        .map(|m| engine.interpret(m, None).unwrap())
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                messages
                    .iter()
                    .map(|m| engine.interpret(m, None).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_dataset_override_from_settings() {
    let mut dataset = KnowledgeDataset::builtin().unwrap();
    for tariff in dataset.tariffs.iter_mut() {
        if tariff.product.as_str() == "tea" && tariff.destination.as_str() == "usa" {
            tariff.base_rate = 9.9;
        }
    }

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(serde_json::to_string(&dataset).unwrap().as_bytes())
        .unwrap();

    let mut settings = Settings::default();
    settings.knowledge.dataset_path = Some(file.path().display().to_string());

    let engine = TradeQueryEngine::from_settings(&settings).unwrap();
    let response = engine
        .interpret("What is the tariff for tea from India to USA?", None)
        .unwrap();
    assert!(response.text.contains("9.9%"));
}

#[test]
fn test_invalid_dataset_override_fails() {
    let mut dataset = KnowledgeDataset::builtin().unwrap();
    let first = dataset.tariffs[0].clone();
    dataset.tariffs.push(first);

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(serde_json::to_string(&dataset).unwrap().as_bytes())
        .unwrap();

    let mut settings = Settings::default();
    settings.knowledge.dataset_path = Some(file.path().display().to_string());

    assert!(matches!(
        TradeQueryEngine::from_settings(&settings),
        Err(Error::Knowledge(_))
    ));
}
