//! # Message Processor Tests
//!
//! Drives the full fallback cascade with mock capabilities: validation,
//! detection, translation, knowledge base lookup, model escalation and the
//! terminal default message.

use agrobot::constants::{ASK_QUESTION_MESSAGE, NOT_FOUND_MESSAGE};
use agrobot::prompts::AGRONOMIST_SYSTEM_PROMPT;
use agrobot::{
    load_kb, CapabilityError, ChatProcessorBuilder, KnowledgeBase, KnowledgeEntry, MatchStrategy,
    SharedKnowledgeBase, UserProfile,
};
use agrobot_test_utils::{
    setup_tracing, write_kb_file, MockAiProvider, MockDetector, MockTranslator,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn multilingual_kb() -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    kb.insert(
        "aphid",
        KnowledgeEntry::english_only("Use neem oil")
            .with_answer("hi", "नीम का तेल प्रयोग करें")
            .with_answer("ta", ""),
    );
    kb.insert("blank", KnowledgeEntry::english_only("").with_answer("hi", ""));
    kb
}

#[tokio::test]
async fn test_empty_input_asks_for_a_question_without_side_effects() {
    setup_tracing();
    let detector = MockDetector::new("hi");
    let translator = MockTranslator::new();
    let model = MockAiProvider::new(vec!["should not be used"]);
    let processor = ChatProcessorBuilder::new()
        .knowledge_base(multilingual_kb())
        .detector(Box::new(detector.clone()))
        .translator(Box::new(translator.clone()))
        .ai_provider(Box::new(model.clone()))
        .build();
    let profile = UserProfile::new().with_preferred_language("ta");

    assert_eq!(processor.process_message(&profile, "").await, ASK_QUESTION_MESSAGE);
    assert_eq!(
        processor.process_message(&UserProfile::default(), "  \n\t ").await,
        ASK_QUESTION_MESSAGE
    );

    assert!(detector.get_calls().is_empty());
    assert!(translator.get_calls().is_empty());
    assert!(model.get_calls().is_empty());
}

#[tokio::test]
async fn test_knowledge_file_round_trip() {
    setup_tracing();
    let (_dir, path) = write_kb_file(&json!([
        {"keywords": "aphid", "answer_en": "Use neem oil"}
    ]));
    let processor = ChatProcessorBuilder::new()
        .knowledge_base(load_kb(&path))
        .build();

    let reply = processor
        .process_message(&UserProfile::default(), "There are aphids on my okra")
        .await;
    assert_eq!(reply, "Use neem oil");

    let entry = processor.find_in_kb("APHID").expect("entry must be found");
    assert_eq!(entry.english(), Some("Use neem oil"));
}

#[tokio::test]
async fn test_unanswered_question_without_model_gets_default_message() {
    setup_tracing();
    let processor = ChatProcessorBuilder::new()
        .knowledge_base(multilingual_kb())
        .build();

    let reply = processor
        .process_message(&UserProfile::default(), "What fertilizer for rice?")
        .await;
    assert_eq!(reply, NOT_FOUND_MESSAGE);
}

#[tokio::test]
async fn test_unanswered_question_escalates_to_model() {
    setup_tracing();
    let model = MockAiProvider::new(vec!["  Apply 120 kg of nitrogen per hectare.  "]);
    let processor = ChatProcessorBuilder::new()
        .knowledge_base(multilingual_kb())
        .ai_provider(Box::new(model.clone()))
        .build();
    let profile = UserProfile::new().with_field("name", "Ravi");

    let reply = processor
        .process_message(&profile, "What fertilizer for rice?")
        .await;

    assert_eq!(reply, "Apply 120 kg of nitrogen per hectare.");
    let calls = model.get_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, AGRONOMIST_SYSTEM_PROMPT);
    assert!(calls[0].1.contains("Question: What fertilizer for rice?"));
    assert!(calls[0].1.contains(r#""name":"Ravi""#));
}

#[tokio::test]
async fn test_failing_or_slow_model_degrades_to_default_message() {
    setup_tracing();
    let failing = ChatProcessorBuilder::new()
        .ai_provider(Box::new(MockAiProvider::failing()))
        .build();
    assert_eq!(
        failing
            .process_message(&UserProfile::default(), "When to harvest maize?")
            .await,
        NOT_FOUND_MESSAGE
    );

    let slow = ChatProcessorBuilder::new()
        .ai_provider(Box::new(
            MockAiProvider::new(vec!["too late"]).with_delay(Duration::from_millis(500)),
        ))
        .capability_timeout(Duration::from_millis(50))
        .build();
    assert_eq!(
        slow.process_message(&UserProfile::default(), "When to harvest maize?")
            .await,
        NOT_FOUND_MESSAGE
    );
    let err = slow
        .try_model_fallback(&UserProfile::default(), "When to harvest maize?", "en")
        .await
        .unwrap_err();
    assert!(matches!(err, CapabilityError::Timeout(_)));
}

#[tokio::test]
async fn test_reply_language_priority() {
    setup_tracing();
    let processor = ChatProcessorBuilder::new()
        .knowledge_base(multilingual_kb())
        .detector(Box::new(MockDetector::new("hi")))
        .build();

    // Preference beats detection, and is truncated to two characters.
    let english = UserProfile::new().with_preferred_language("english");
    assert_eq!(
        processor.process_message(&english, "aphid help").await,
        "Use neem oil"
    );

    // Detection is used when there is no preference.
    assert_eq!(
        processor
            .process_message(&UserProfile::default(), "aphid help")
            .await,
        "नीम का तेल प्रयोग करें"
    );

    // Without a detector English is assumed.
    let plain = ChatProcessorBuilder::new()
        .knowledge_base(multilingual_kb())
        .build();
    assert_eq!(
        plain
            .process_message(&UserProfile::default(), "aphid help")
            .await,
        "Use neem oil"
    );
}

#[tokio::test]
async fn test_foreign_input_is_translated_before_matching() {
    setup_tracing();
    let translator = MockTranslator::new();
    translator.add_translation("माहू से कैसे बचें?", "en", "How to avoid aphids?");
    let processor = ChatProcessorBuilder::new()
        .knowledge_base(multilingual_kb())
        .detector(Box::new(MockDetector::new("hi")))
        .translator(Box::new(translator.clone()))
        .build();

    let reply = processor
        .process_message(&UserProfile::default(), "माहू से कैसे बचें?")
        .await;

    assert_eq!(reply, "नीम का तेल प्रयोग करें");
    assert_eq!(
        translator.get_calls(),
        vec![("माहू से कैसे बचें?".to_string(), "en".to_string())]
    );
}

#[tokio::test]
async fn test_missing_language_slot_uses_english() {
    setup_tracing();
    let tamil = UserProfile::new().with_preferred_language("ta");

    let plain = ChatProcessorBuilder::new()
        .knowledge_base(multilingual_kb())
        .build();
    assert_eq!(plain.process_message(&tamil, "aphid").await, "Use neem oil");

    // A translator does not change this: the English answer is returned as written.
    let translator = MockTranslator::new();
    let translating = ChatProcessorBuilder::new()
        .knowledge_base(multilingual_kb())
        .translator(Box::new(translator.clone()))
        .build();
    assert_eq!(
        translating.process_message(&tamil, "aphid").await,
        "Use neem oil"
    );
    assert!(translator.get_calls().is_empty());
}

#[tokio::test]
async fn test_entry_without_english_is_translated_to_target() {
    setup_tracing();
    let mut kb = KnowledgeBase::new();
    kb.insert(
        "mulch",
        KnowledgeEntry::default().with_answer("hi", "पुआल की परत बिछाएं"),
    );
    let tamil = UserProfile::new().with_preferred_language("ta");

    let translator = MockTranslator::new();
    let translating = ChatProcessorBuilder::new()
        .knowledge_base(kb.clone())
        .translator(Box::new(translator.clone()))
        .build();
    assert_eq!(
        translating.process_message(&tamil, "mulch for summer").await,
        "[ta] पुआल की परत बिछाएं"
    );
    assert_eq!(
        translator.get_calls(),
        vec![("पुआल की परत बिछाएं".to_string(), "ta".to_string())]
    );

    // Without a translator the only answer there is comes back untranslated.
    let plain = ChatProcessorBuilder::new().knowledge_base(kb).build();
    assert_eq!(
        plain.process_message(&tamil, "mulch for summer").await,
        "पुआल की परत बिछाएं"
    );
}

#[tokio::test]
async fn test_translation_destination_is_cut_to_two_characters() {
    setup_tracing();
    let translator = MockTranslator::new();
    let processor = ChatProcessorBuilder::new()
        .translator(Box::new(translator.clone()))
        .build();

    let translated = processor.translate_text("Use neem oil", "tamil").await;

    assert_eq!(translated, "[ta] Use neem oil");
    assert_eq!(
        translator.get_calls(),
        vec![("Use neem oil".to_string(), "ta".to_string())]
    );
}

#[tokio::test]
async fn test_failing_translator_keeps_original_text() {
    setup_tracing();
    let processor = ChatProcessorBuilder::new()
        .knowledge_base(multilingual_kb())
        .detector(Box::new(MockDetector::new("ta")))
        .translator(Box::new(MockTranslator::failing()))
        .build();

    // Input translation fails, so the raw text is matched; the empty Tamil slot
    // falls back to English.
    let reply = processor
        .process_message(&UserProfile::default(), "aphid பிரச்சனை")
        .await;
    assert_eq!(reply, "Use neem oil");

    let err = processor.try_translate("hello", "tamil").await.unwrap_err();
    assert!(matches!(err, CapabilityError::Api(_)));
}

#[tokio::test]
async fn test_model_reply_is_translated_for_non_english_target() {
    setup_tracing();
    let translator = MockTranslator::new();
    let processor = ChatProcessorBuilder::new()
        .translator(Box::new(translator.clone()))
        .ai_provider(Box::new(MockAiProvider::new(vec!["Sow after the first rain."])))
        .build();
    let profile = UserProfile::new().with_preferred_language("hi");

    let reply = processor.process_message(&profile, "When to sow millet?").await;

    assert_eq!(reply, "[hi] Sow after the first rain.");
}

#[tokio::test]
async fn test_unusable_entry_escalates() {
    setup_tracing();
    let model = MockAiProvider::new(vec!["Model answer"]);
    let processor = ChatProcessorBuilder::new()
        .knowledge_base(multilingual_kb())
        .ai_provider(Box::new(model.clone()))
        .build();

    let reply = processor
        .process_message(&UserProfile::default(), "a blank entry")
        .await;

    assert_eq!(reply, "Model answer");
    assert_eq!(model.get_calls().len(), 1);
}

#[tokio::test]
async fn test_failing_detector_assumes_english() {
    setup_tracing();
    let translator = MockTranslator::new();
    let processor = ChatProcessorBuilder::new()
        .knowledge_base(multilingual_kb())
        .detector(Box::new(MockDetector::failing()))
        .translator(Box::new(translator.clone()))
        .build();

    assert_eq!(processor.detect_language("???").await, "en");
    let reply = processor
        .process_message(&UserProfile::default(), "aphid?")
        .await;
    assert_eq!(reply, "Use neem oil");
    assert!(translator.get_calls().is_empty(), "English input is not translated");
}

#[tokio::test]
async fn test_absent_capabilities_report_unavailable() {
    let processor = ChatProcessorBuilder::new().build();

    assert!(matches!(
        processor.try_detect_language("hello").await,
        Err(CapabilityError::Unavailable(_))
    ));
    assert!(matches!(
        processor.try_translate("hello", "hi").await,
        Err(CapabilityError::Unavailable(_))
    ));
    assert!(matches!(
        processor
            .try_model_fallback(&UserProfile::default(), "hello", "en")
            .await,
        Err(CapabilityError::Unavailable(_))
    ));
    assert_eq!(processor.translate_text("hello", "hi").await, "hello");
    assert_eq!(
        processor
            .model_fallback(&UserProfile::default(), "hello", "en")
            .await,
        ""
    );
}

#[tokio::test]
async fn test_non_empty_input_always_gets_non_empty_reply() {
    setup_tracing();
    let processors = [
        ChatProcessorBuilder::new().build(),
        ChatProcessorBuilder::new()
            .knowledge_base(multilingual_kb())
            .match_strategy(MatchStrategy::similarity())
            .detector(Box::new(MockDetector::failing()))
            .translator(Box::new(MockTranslator::failing()))
            .ai_provider(Box::new(MockAiProvider::failing()))
            .build(),
    ];
    let inputs = ["x", "blank", "aphid", "???", "धान", "How do I store onions?"];

    for processor in &processors {
        for input in inputs {
            let reply = processor
                .process_message(&UserProfile::default(), input)
                .await;
            assert!(!reply.trim().is_empty(), "empty reply for {input:?}");
        }
    }
}

#[tokio::test]
async fn test_reload_is_visible_to_processor() {
    setup_tracing();
    let shared = Arc::new(SharedKnowledgeBase::default());
    let processor = ChatProcessorBuilder::new()
        .shared_knowledge_base(shared.clone())
        .build();
    assert_eq!(
        processor
            .process_message(&UserProfile::default(), "aphid")
            .await,
        NOT_FOUND_MESSAGE
    );

    let (_dir, path) = write_kb_file(&json!({"aphid": "Use neem oil"}));
    let before = shared.snapshot();
    assert_eq!(shared.reload(&path), 1);

    assert!(before.is_empty(), "old snapshots are never mutated");
    assert_eq!(
        processor
            .process_message(&UserProfile::default(), "aphid")
            .await,
        "Use neem oil"
    );
}
