use grounded_qa::cases::case_model::TestCaseBatch;
use grounded_qa::error::QaError;
use grounded_qa::knowledge::builder::{SourceDocument, build_knowledge_base};
use grounded_qa::knowledge::knowledge_model::{KnowledgeBase, UiElement};
use grounded_qa::knowledge::store::{FileStore, KnowledgeStore, MemoryStore};

mod common;
use common::fixtures::{CHECKOUT_HTML, case, checkout_knowledge, html_doc, text_doc};

// ============================================================================
// 1. Builder: partitioning and requirements
// ============================================================================

#[test]
fn two_text_documents_become_two_requirements_in_upload_order() {
    let docs = vec![
        text_doc("product_specs.md", "# Specs\nDiscount SAVE15 gives 15% off."),
        html_doc("checkout.html", CHECKOUT_HTML),
        text_doc("ui_ux_guide.txt", "Errors are shown in red."),
    ];

    let ingestion = build_knowledge_base(&docs).unwrap();

    assert_eq!(ingestion.knowledge.requirements.len(), 2);
    assert!(ingestion.knowledge.requirements[0].starts_with("# Specs"));
    assert_eq!(ingestion.knowledge.requirements[1], "Errors are shown in red.");
    assert_eq!(ingestion.knowledge.ui_elements.len(), 3);
    assert!(ingestion.skipped.is_empty());
}

#[test]
fn requirement_text_is_kept_verbatim() {
    let raw = "  Line one\n\nLine two  \n";
    let docs = vec![text_doc("notes.txt", raw), html_doc("page.html", CHECKOUT_HTML)];

    let ingestion = build_knowledge_base(&docs).unwrap();
    assert_eq!(ingestion.knowledge.requirements, vec![raw.to_string()]);
}

#[test]
fn unsupported_formats_are_skipped_with_a_warning() {
    let docs = vec![
        SourceDocument::new("spec.pdf", vec![0x25, 0x50, 0x44, 0x46]),
        text_doc("spec.txt", "Shipping is free over $50."),
        html_doc("checkout.html", CHECKOUT_HTML),
    ];

    let ingestion = build_knowledge_base(&docs).unwrap();

    assert_eq!(ingestion.knowledge.requirements.len(), 1);
    assert_eq!(ingestion.skipped.len(), 1);
    assert_eq!(ingestion.skipped[0].filename, "spec.pdf");
    assert_eq!(ingestion.skipped[0].extension, "pdf");
}

#[test]
fn whitespace_only_documents_contribute_nothing() {
    let docs = vec![text_doc("blank.md", "   \n\t "), html_doc("checkout.html", CHECKOUT_HTML)];

    let ingestion = build_knowledge_base(&docs).unwrap();
    assert!(ingestion.knowledge.requirements.is_empty());
    assert!(ingestion.skipped.is_empty());
}

#[test]
fn html_extension_is_case_insensitive() {
    let docs = vec![html_doc("CHECKOUT.HTML", CHECKOUT_HTML)];
    assert!(build_knowledge_base(&docs).is_ok());
}

#[test]
fn last_html_document_wins() {
    let docs = vec![
        html_doc("first.html", r#"<input id="fromFirst">"#),
        html_doc("second.html", r#"<input id="fromSecond">"#),
    ];

    let ingestion = build_knowledge_base(&docs).unwrap();

    assert_eq!(ingestion.page.filename, "second.html");
    assert_eq!(ingestion.knowledge.ui_elements.len(), 1);
    assert_eq!(ingestion.knowledge.ui_elements[0].id.as_deref(), Some("fromSecond"));
}

// ============================================================================
// 2. Builder: fatal conditions
// ============================================================================

#[test]
fn empty_batch_is_rejected() {
    let err = build_knowledge_base(&[]).unwrap_err();
    assert!(matches!(err, QaError::EmptyInput));
}

#[test]
fn batch_without_html_is_rejected() {
    let docs = vec![text_doc("a.txt", "one"), text_doc("b.md", "two")];

    let err = build_knowledge_base(&docs).unwrap_err();
    assert!(matches!(err, QaError::MissingHtml));
}

#[test]
fn html_without_supported_tags_is_rejected() {
    let docs = vec![html_doc("about.html", "<html><body><p>About us</p></body></html>")];

    let err = build_knowledge_base(&docs).unwrap_err();
    match err {
        QaError::NoUiElements { filename } => assert_eq!(filename, "about.html"),
        other => panic!("expected NoUiElements, got {:?}", other),
    }
}

// ============================================================================
// 3. Model: JSON shape and round-trip
// ============================================================================

#[test]
fn knowledge_base_json_round_trip() {
    let knowledge = checkout_knowledge();

    let json = serde_json::to_string(&knowledge).unwrap();
    let back: KnowledgeBase = serde_json::from_str(&json).unwrap();

    assert_eq!(back, knowledge);
}

#[test]
fn ui_element_serializes_every_field() {
    let el = UiElement::new("input").with_id("emailInput").with_type("email");
    let value = serde_json::to_value(&el).unwrap();

    assert_eq!(value["tag"], "input");
    assert_eq!(value["id"], "emailInput");
    assert!(value["name"].is_null());
    assert_eq!(value["type"], "email");
    assert_eq!(value["text"], "");
    assert!(value["class"].is_null());
}

#[test]
fn knowledge_base_has_two_top_level_fields() {
    let value = serde_json::to_value(checkout_knowledge()).unwrap();
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();

    assert_eq!(keys.len(), 2);
    assert!(value.get("requirements").is_some());
    assert!(value.get("ui_elements").is_some());
}

#[test]
fn summary_counts_and_stable_fingerprint() {
    let knowledge = checkout_knowledge();
    let summary = knowledge.summary();

    assert_eq!(summary.total_requirements, 1);
    assert_eq!(summary.total_ui_elements, 3);
    assert_eq!(summary.fingerprint.len(), 40);
    assert_eq!(summary.fingerprint, checkout_knowledge().fingerprint());

    let mut changed = checkout_knowledge();
    changed.requirements.push("another".into());
    assert_ne!(changed.fingerprint(), summary.fingerprint);
}

#[test]
fn reference_keys_skip_absent_and_empty_values() {
    let el = UiElement::new("input").with_name("email");
    let keys: Vec<&str> = el.reference_keys().collect();
    assert_eq!(keys, vec!["email"]);

    let button = UiElement::new("button").with_id("pay").with_text("Pay");
    let keys: Vec<&str> = button.reference_keys().collect();
    assert_eq!(keys, vec!["pay", "Pay"]);
}

// ============================================================================
// 4. Stores
// ============================================================================

#[test]
fn file_store_round_trips_knowledge_and_cases() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());

    store.save_knowledge(&checkout_knowledge()).unwrap();
    assert_eq!(store.load_knowledge().unwrap(), checkout_knowledge());

    let batch = TestCaseBatch::new(vec![case("TC_001", &["emailInput"])]);
    store.save_test_cases(&batch).unwrap();
    assert_eq!(store.load_test_cases().unwrap(), batch);
}

#[test]
fn file_store_save_replaces_previous_knowledge() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());

    store.save_knowledge(&checkout_knowledge()).unwrap();
    let replacement = KnowledgeBase::new(vec![], vec![UiElement::new("a").with_text("Home")]);
    store.save_knowledge(&replacement).unwrap();

    assert_eq!(store.load_knowledge().unwrap(), replacement);
    assert!(!dir.path().join("knowledge.tmp").exists());
}

#[test]
fn file_store_missing_records_are_not_found_errors() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("never-created"));

    assert!(matches!(
        store.load_knowledge().unwrap_err(),
        QaError::KnowledgeBaseNotFound { .. }
    ));
    assert!(matches!(
        store.load_test_cases().unwrap_err(),
        QaError::TestCasesNotFound { .. }
    ));
}

#[test]
fn file_store_corrupt_knowledge_is_structural_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("knowledge.json"), "{ not json").unwrap();
    let store = FileStore::new(dir.path());

    assert!(matches!(
        store.load_knowledge().unwrap_err(),
        QaError::Structural { .. }
    ));
}

#[test]
fn file_store_saves_page_copy() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());

    let path = store.save_page(CHECKOUT_HTML.as_bytes()).unwrap();

    assert_eq!(path, dir.path().join("page.html"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), CHECKOUT_HTML);
}

#[test]
fn memory_store_behaves_like_a_single_slot() {
    let store = MemoryStore::new();
    assert!(matches!(
        store.load_knowledge().unwrap_err(),
        QaError::KnowledgeBaseNotFound { .. }
    ));

    store.save_knowledge(&checkout_knowledge()).unwrap();
    store.save_knowledge(&KnowledgeBase::default()).unwrap();
    assert_eq!(store.load_knowledge().unwrap(), KnowledgeBase::default());
}
