use grounded_qa::cases::case_model::TestCase;
use grounded_qa::knowledge::builder::SourceDocument;
use grounded_qa::knowledge::knowledge_model::{KnowledgeBase, UiElement};

/// The checkout page used across the end-to-end scenarios.
pub const CHECKOUT_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Checkout</title></head>
<body>
  <form id="checkout">
    <input id="emailInput" type="email" class="field wide">
    <input id="nameInput" type="text">
    <button id="payNowButton">PayNow</button>
  </form>
</body>
</html>
"#;

pub fn checkout_knowledge() -> KnowledgeBase {
    KnowledgeBase::new(
        vec!["Discount code SAVE15 gives 15% off.".to_string()],
        vec![
            UiElement::new("input")
                .with_id("emailInput")
                .with_type("email")
                .with_class("field wide"),
            UiElement::new("input").with_id("nameInput").with_type("text"),
            UiElement::new("button")
                .with_id("payNowButton")
                .with_text("PayNow"),
        ],
    )
}

pub fn case(test_id: &str, used: &[&str]) -> TestCase {
    TestCase::new(test_id, &format!("Scenario {}", test_id), used)
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn html_doc(name: &str, html: &str) -> SourceDocument {
    SourceDocument::new(name, html.as_bytes().to_vec())
}

pub fn text_doc(name: &str, text: &str) -> SourceDocument {
    SourceDocument::new(name, text.as_bytes().to_vec())
}
