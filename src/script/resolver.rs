use crate::knowledge::knowledge_model::UiElement;
use crate::script::script_model::{ScriptStep, Selector};

/// References that are clicked even though they do not mention "button".
pub const SUBMIT_ACTION_NAMES: [&str; 7] = [
    "payNow",
    "PayNow",
    "submit",
    "placeOrder",
    "checkout",
    "signIn",
    "login",
];

/// Value typed into fields that have no entry in `SAMPLE_VALUES`.
pub const DEFAULT_SAMPLE_VALUE: &str = "test_data";

/// Sample input per element reference.
pub const SAMPLE_VALUES: [(&str, &str); 10] = [
    ("emailInput", "test@example.com"),
    ("nameInput", "John Doe"),
    ("cardNumber", "1234567890123456"),
    ("expiryDate", "2025-12"),
    ("cvvInput", "123"),
    ("phoneInput", "555-0100"),
    ("addressInput", "221B Baker Street"),
    ("zipCode", "90210"),
    ("passwordInput", "TestPass123!"),
    ("discountCode", "SAVE10"),
];

// ============================================================================
// Resolution
// ============================================================================

/// Resolve a reference name to a selector.
///
/// Keys are tried in priority order across all elements: any `id` match
/// first, then any `name` match, then any exact `text` match. Within a key,
/// the first element in document order wins.
pub fn resolve_selector(reference: &str, elements: &[UiElement]) -> Option<Selector> {
    if reference.is_empty() {
        return None;
    }

    if elements.iter().any(|el| el.id.as_deref() == Some(reference)) {
        return Some(Selector::Id {
            value: reference.to_string(),
        });
    }

    if elements.iter().any(|el| el.name.as_deref() == Some(reference)) {
        return Some(Selector::Name {
            value: reference.to_string(),
        });
    }

    elements
        .iter()
        .find(|el| el.text == reference)
        .map(|el| Selector::Text {
            tag: el.tag.clone(),
            text: el.text.clone(),
        })
}

/// Whether a resolved reference is activated rather than typed into.
pub fn is_click_reference(reference: &str) -> bool {
    reference.to_lowercase().contains("button") || SUBMIT_ACTION_NAMES.contains(&reference)
}

pub fn sample_value(reference: &str) -> &'static str {
    SAMPLE_VALUES
        .iter()
        .find(|(key, _)| *key == reference)
        .map(|(_, value)| *value)
        .unwrap_or(DEFAULT_SAMPLE_VALUE)
}

/// The interaction step for one referenced element.
pub fn plan_interaction(reference: &str, elements: &[UiElement]) -> ScriptStep {
    let Some(selector) = resolve_selector(reference, elements) else {
        return ScriptStep::Unresolved {
            reference: reference.to_string(),
        };
    };

    if is_click_reference(reference) {
        ScriptStep::Click {
            reference: reference.to_string(),
            selector,
        }
    } else {
        ScriptStep::Type {
            reference: reference.to_string(),
            selector,
            value: sample_value(reference).to_string(),
        }
    }
}
