use serde::{Deserialize, Serialize};

use crate::knowledge::knowledge_model::normalize_space;

// ============================================================================
// Script intermediate model
// ============================================================================

/// How a resolved element is located in the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Selector {
    /// `id` attribute equals the value
    Id { value: String },

    /// `name` attribute equals the value
    Name { value: String },

    /// Element of `tag` whose normalized text equals `text`
    Text { tag: String, text: String },
}

impl Selector {
    /// XPath form of the selector. Usable by every renderer.
    ///
    /// Text is compared through `normalize-space()`, so the literal is
    /// normalized the same way.
    pub fn to_xpath(&self) -> String {
        match self {
            Selector::Id { value } => format!("//*[@id={}]", xpath_literal(value)),
            Selector::Name { value } => format!("//*[@name={}]", xpath_literal(value)),
            Selector::Text { tag, text } => {
                format!(
                    "//{}[normalize-space(.)={}]",
                    tag,
                    xpath_literal(&normalize_space(text))
                )
            }
        }
    }
}

/// Quote a string for XPath 1.0, which has no escape sequences.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// A single typed step of a routine or of the shared setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Open the page under test (setup only)
    Navigate { page_path: String },

    /// Print a progress line
    Log { message: String },

    /// Type `value` into the element
    Type {
        reference: String,
        selector: Selector,
        value: String,
    },

    /// Click the element
    Click { reference: String, selector: Selector },

    /// Reference that matched no element; rendered as a comment
    Unresolved { reference: String },

    /// Free-form comment line
    Comment { text: String },

    /// Fixed pause
    Wait { seconds: u64 },

    /// Commented-out assertion placeholder
    AssertionPlaceholder { expected: String },
}

/// One test routine, generated from one selected test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub test_id: String,
    /// Identifier-safe routine name, e.g. `test_tc_001`
    pub name: String,
    pub title: String,
    pub steps: Vec<ScriptStep>,
}

impl Routine {
    pub fn unresolved(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                ScriptStep::Unresolved { reference } => Some(reference.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A complete script: shared setup, implicit teardown, and ordered routines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedScript {
    pub page_path: String,
    pub headless: bool,
    pub setup: Vec<ScriptStep>,
    pub routines: Vec<Routine>,
}

impl GeneratedScript {
    pub fn routine_names(&self) -> Vec<&str> {
        self.routines.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn unresolved_count(&self) -> usize {
        self.routines.iter().map(|r| r.unresolved().len()).sum()
    }
}
