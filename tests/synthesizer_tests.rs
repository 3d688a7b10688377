use grounded_qa::error::QaError;
use grounded_qa::knowledge::knowledge_model::{KnowledgeBase, UiElement};
use grounded_qa::script::resolver::{
    DEFAULT_SAMPLE_VALUE, is_click_reference, plan_interaction, resolve_selector, sample_value,
};
use grounded_qa::script::script_model::{ScriptStep, Selector};
use grounded_qa::script::synthesizer::{SynthesisOptions, routine_name, synthesize, synthesize_json};

mod common;
use common::fixtures::{case, checkout_knowledge, ids};

fn options() -> SynthesisOptions {
    SynthesisOptions::default()
}

fn interactions(steps: &[ScriptStep]) -> Vec<&ScriptStep> {
    steps
        .iter()
        .filter(|s| {
            matches!(
                s,
                ScriptStep::Type { .. } | ScriptStep::Click { .. } | ScriptStep::Unresolved { .. }
            )
        })
        .collect()
}

// ============================================================================
// 1. Selector resolution
// ============================================================================

#[test]
fn resolves_by_id_then_name_then_text() {
    let elements = vec![
        UiElement::new("input").with_id("email").with_name("contact"),
        UiElement::new("input").with_name("email2"),
        UiElement::new("button").with_text("Submit order"),
    ];

    assert_eq!(
        resolve_selector("email", &elements),
        Some(Selector::Id { value: "email".into() })
    );
    assert_eq!(
        resolve_selector("email2", &elements),
        Some(Selector::Name { value: "email2".into() })
    );
    assert_eq!(
        resolve_selector("Submit order", &elements),
        Some(Selector::Text {
            tag: "button".into(),
            text: "Submit order".into()
        })
    );
    assert_eq!(resolve_selector("missing", &elements), None);
}

#[test]
fn id_match_beats_earlier_name_match() {
    // The first element matches by name, a later one by id: id has priority.
    let elements = vec![
        UiElement::new("input").with_name("promo"),
        UiElement::new("input").with_id("promo"),
    ];

    assert_eq!(
        resolve_selector("promo", &elements),
        Some(Selector::Id { value: "promo".into() })
    );
}

#[test]
fn text_match_is_exact() {
    let elements = vec![UiElement::new("button").with_text("Pay Now")];

    assert!(resolve_selector("pay now", &elements).is_none());
    assert!(resolve_selector("Pay", &elements).is_none());
    assert!(resolve_selector("", &elements).is_none());
}

#[test]
fn click_policy() {
    assert!(is_click_reference("payNowButton"));
    assert!(is_click_reference("SUBMITBUTTON"));
    assert!(is_click_reference("payNow"));
    assert!(is_click_reference("submit"));
    assert!(!is_click_reference("emailInput"));
    assert!(!is_click_reference("submitted"));
}

#[test]
fn sample_values() {
    assert_eq!(sample_value("emailInput"), "test@example.com");
    assert_eq!(sample_value("cardNumber"), "1234567890123456");
    assert_eq!(sample_value("cardNumber").len(), 16);
    assert!(sample_value("cardNumber").chars().all(|c| c.is_ascii_digit()));
    assert_eq!(sample_value("favoriteColor"), DEFAULT_SAMPLE_VALUE);
}

#[test]
fn plan_interaction_types_into_fields_and_clicks_buttons() {
    let knowledge = checkout_knowledge();

    assert_eq!(
        plan_interaction("emailInput", &knowledge.ui_elements),
        ScriptStep::Type {
            reference: "emailInput".into(),
            selector: Selector::Id { value: "emailInput".into() },
            value: "test@example.com".into(),
        }
    );
    assert_eq!(
        plan_interaction("payNowButton", &knowledge.ui_elements),
        ScriptStep::Click {
            reference: "payNowButton".into(),
            selector: Selector::Id { value: "payNowButton".into() },
        }
    );
    assert_eq!(
        plan_interaction("discountCode", &knowledge.ui_elements),
        ScriptStep::Unresolved {
            reference: "discountCode".into()
        }
    );
}

#[test]
fn xpath_literal_handles_quotes() {
    let plain = Selector::Text { tag: "a".into(), text: "Help".into() };
    assert_eq!(plain.to_xpath(), "//a[normalize-space(.)='Help']");

    let apostrophe = Selector::Text { tag: "button".into(), text: "Don't pay".into() };
    assert_eq!(apostrophe.to_xpath(), "//button[normalize-space(.)=\"Don't pay\"]");

    let both = Selector::Text { tag: "a".into(), text: "a'b\"c".into() };
    assert_eq!(both.to_xpath(), "//a[normalize-space(.)=concat('a', \"'\", 'b\"c')]");
}

// ============================================================================
// 2. Routine construction
// ============================================================================

#[test]
fn routine_names_are_lowercase_and_whitespace_free() {
    assert_eq!(routine_name("TC_001"), "test_tc_001");
    assert_eq!(routine_name("TC 002"), "test_tc002");
    assert_eq!(routine_name("Login-Flow"), "test_login_flow");
    assert_eq!(routine_name("   "), "test_case");
}

#[test]
fn routine_emits_elements_in_listed_order_then_wait_and_placeholder() {
    let mut tc = case("TC_001", &["payNowButton", "emailInput"]);
    tc.expected_result = "Payment Successful".into();

    let script = synthesize(&[tc], &checkout_knowledge(), &ids(&["TC_001"]), &options()).unwrap();
    let steps = &script.routines[0].steps;

    assert!(matches!(steps[0], ScriptStep::Log { .. }));
    let acts = interactions(steps);
    assert!(matches!(acts[0], ScriptStep::Click { reference, .. } if reference == "payNowButton"));
    assert!(matches!(acts[1], ScriptStep::Type { reference, .. } if reference == "emailInput"));

    let n = steps.len();
    assert_eq!(steps[n - 2], ScriptStep::Wait { seconds: 2 });
    assert_eq!(
        steps[n - 1],
        ScriptStep::AssertionPlaceholder {
            expected: "Payment Successful".into()
        }
    );
}

#[test]
fn setup_navigates_to_page_once() {
    let opts = SynthesisOptions {
        page_path: "/tmp/checkout.html".into(),
        ..SynthesisOptions::default()
    };
    let script = synthesize(&[], &checkout_knowledge(), &[], &opts).unwrap();

    assert_eq!(
        script.setup,
        vec![ScriptStep::Navigate {
            page_path: "/tmp/checkout.html".into()
        }]
    );
    assert!(script.routines.is_empty());
}

#[test]
fn validation_warning_is_carried_as_comment() {
    let mut tc = case("TC_002", &["discountCode"]);
    tc.validation_warning = Some(r#"Invalid elements referenced: ["discountCode"]"#.into());

    let script = synthesize(&[tc], &checkout_knowledge(), &ids(&["TC_002"]), &options()).unwrap();

    assert!(script.routines[0].steps.contains(&ScriptStep::Comment {
        text: r#"Invalid elements referenced: ["discountCode"]"#.into()
    }));
}

// ============================================================================
// 3. Selection semantics
// ============================================================================

#[test]
fn only_selected_cases_become_routines() {
    let cases = vec![case("TC_001", &[]), case("TC_002", &[]), case("TC_003", &[])];
    let script = synthesize(&cases, &checkout_knowledge(), &ids(&["TC_003", "TC_001"]), &options()).unwrap();

    assert_eq!(script.routine_names(), vec!["test_tc_001", "test_tc_003"]);
}

#[test]
fn routine_order_follows_test_case_order_not_selection_order() {
    let cases = vec![case("B", &[]), case("A", &[]), case("C", &[])];
    let script = synthesize(&cases, &checkout_knowledge(), &ids(&["C", "A", "B"]), &options()).unwrap();

    assert_eq!(script.routine_names(), vec!["test_b", "test_a", "test_c"]);
}

#[test]
fn duplicate_selected_ids_do_not_duplicate_routines() {
    let cases = vec![case("TC_001", &[]), case("TC_002", &[])];
    let script = synthesize(
        &cases,
        &checkout_knowledge(),
        &ids(&["TC_001", "TC_001", "TC_002", "TC_001"]),
        &options(),
    )
    .unwrap();

    assert_eq!(script.routines.len(), 2);
}

#[test]
fn duplicate_test_ids_in_batch_produce_one_routine() {
    let cases = vec![case("TC_001", &["emailInput"]), case("TC_001", &["nameInput"])];
    let script = synthesize(&cases, &checkout_knowledge(), &ids(&["TC_001"]), &options()).unwrap();

    assert_eq!(script.routines.len(), 1);
    let acts = interactions(&script.routines[0].steps);
    assert!(matches!(acts[0], ScriptStep::Type { reference, .. } if reference == "emailInput"));
}

#[test]
fn colliding_routine_names_are_suffixed() {
    let cases = vec![case("TC 1", &[]), case("TC1", &[])];
    let script = synthesize(&cases, &checkout_knowledge(), &ids(&["TC 1", "TC1"]), &options()).unwrap();

    assert_eq!(script.routine_names(), vec!["test_tc1", "test_tc1_2"]);
}

#[test]
fn unknown_selected_ids_are_ignored() {
    let cases = vec![case("TC_001", &[])];
    let script = synthesize(&cases, &checkout_knowledge(), &ids(&["TC_404"]), &options()).unwrap();
    assert!(script.routines.is_empty());
}

// ============================================================================
// 4. Failure semantics
// ============================================================================

#[test]
fn unresolved_elements_never_fail_synthesis() {
    let cases = vec![case("TC_002", &["discountCode", "giftWrap"])];
    let script = synthesize(&cases, &checkout_knowledge(), &ids(&["TC_002"]), &options()).unwrap();

    assert_eq!(script.routines[0].unresolved(), vec!["discountCode", "giftWrap"]);
    assert_eq!(script.unresolved_count(), 2);
}

#[test]
fn knowledge_without_elements_is_rejected() {
    let knowledge = KnowledgeBase::new(vec!["req".into()], vec![]);
    let err = synthesize(&[case("TC_001", &[])], &knowledge, &ids(&["TC_001"]), &options()).unwrap_err();

    assert!(matches!(err, QaError::InvalidStructure(_)));
}

#[test]
fn undecodable_json_inputs_are_structural_errors() {
    let knowledge_json = serde_json::to_string(&checkout_knowledge()).unwrap();

    let err = synthesize_json("not json", &knowledge_json, &[], &options()).unwrap_err();
    assert!(matches!(err, QaError::Structural { .. }));

    let err = synthesize_json(r#"{"test_cases": []}"#, "{\"requirements\": 3}", &[], &options()).unwrap_err();
    assert!(matches!(err, QaError::Structural { .. }));
}

#[test]
fn json_inputs_synthesize() {
    let knowledge_json = serde_json::to_string(&checkout_knowledge()).unwrap();
    let cases_json = r#"{"test_cases": [{"test_id": "TC_001", "used_elements": ["emailInput"]}]}"#;

    let script = synthesize_json(cases_json, &knowledge_json, &ids(&["TC_001"]), &options()).unwrap();
    assert_eq!(script.routine_names(), vec!["test_tc_001"]);
}
