use std::collections::BTreeSet;

use crate::cases::case_model::TestCase;
use crate::knowledge::knowledge_model::KnowledgeBase;

pub const WARNING_PREFIX: &str = "Invalid elements referenced:";

/// Every string a test case may use to reference an element: the union of
/// all non-empty ids, names and texts in the knowledge base.
pub fn valid_references(knowledge: &KnowledgeBase) -> BTreeSet<&str> {
    knowledge
        .ui_elements
        .iter()
        .flat_map(|el| el.reference_keys())
        .collect()
}

/// References in `test_case` that no element answers to, sorted and deduplicated.
pub fn unresolved_references<'a>(
    test_case: &'a TestCase,
    valid: &BTreeSet<&str>,
) -> BTreeSet<&'a str> {
    test_case
        .used_elements
        .iter()
        .map(String::as_str)
        .filter(|reference| !valid.contains(reference))
        .collect()
}

/// Attach (or clear) `validation_warning` on every test case.
///
/// Ungrounded cases are kept, not dropped; synthesis still attempts them.
/// Re-validating against the same knowledge base yields the same warnings.
pub fn validate_test_cases(test_cases: &mut [TestCase], knowledge: &KnowledgeBase) {
    let valid = valid_references(knowledge);

    for tc in test_cases.iter_mut() {
        let warning = {
            let invalid = unresolved_references(tc, &valid);
            if invalid.is_empty() {
                None
            } else {
                tracing::warn!("{}: ungrounded references {:?}", tc.test_id, invalid);
                Some(format_warning(&invalid))
            }
        };
        tc.validation_warning = warning;
    }
}

/// Names are written as a JSON string array so empty names and names
/// containing commas or brackets stay unambiguous.
fn format_warning(invalid: &BTreeSet<&str>) -> String {
    let names: Vec<&str> = invalid.iter().copied().collect();
    let list = serde_json::to_string(&names).unwrap_or_else(|_| format!("{:?}", names));
    format!("{} {}", WARNING_PREFIX, list)
}

/// Recover the reference names listed in a warning produced by this module.
/// Anything else yields an empty set.
pub fn warning_references(warning: &str) -> BTreeSet<String> {
    warning
        .strip_prefix(WARNING_PREFIX)
        .and_then(|rest| serde_json::from_str::<Vec<String>>(rest.trim()).ok())
        .map(|names| names.into_iter().collect())
        .unwrap_or_default()
}
