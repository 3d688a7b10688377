use std::collections::HashSet;

use crate::cases::case_model::{TestCase, TestCaseBatch};
use crate::error::{QaError, Result};
use crate::knowledge::knowledge_model::KnowledgeBase;
use crate::script::resolver::plan_interaction;
use crate::script::script_model::{GeneratedScript, Routine, ScriptStep};

/// Knobs for the generated script that do not come from the test cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Path of the HTML page the setup navigates to
    pub page_path: String,
    /// Pause after each routine's interactions
    pub wait_seconds: u64,
    pub headless: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            page_path: "data/page.html".to_string(),
            wait_seconds: 2,
            headless: false,
        }
    }
}

// ============================================================================
// Synthesis
// ============================================================================

/// Build a script with one routine per selected test id.
///
/// Selection is a set: duplicate or unknown ids are ignored, and routines
/// follow the order of `test_cases`, not of `selected_ids`. A test id that
/// appears twice in `test_cases` produces one routine (the first).
/// Unresolved element references degrade to comments and never fail.
pub fn synthesize(
    test_cases: &[TestCase],
    knowledge: &KnowledgeBase,
    selected_ids: &[String],
    options: &SynthesisOptions,
) -> Result<GeneratedScript> {
    if !knowledge.has_ui_elements() {
        return Err(QaError::InvalidStructure(
            "knowledge base has no UI elements to resolve against".to_string(),
        ));
    }

    let selected: HashSet<&str> = selected_ids.iter().map(String::as_str).collect();
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut used_names: HashSet<String> = HashSet::new();
    let mut routines = Vec::new();

    for tc in test_cases {
        if !selected.contains(tc.test_id.as_str()) || !emitted.insert(tc.test_id.as_str()) {
            continue;
        }

        let name = unique_name(routine_name(&tc.test_id), &mut used_names);
        routines.push(build_routine(tc, name, knowledge, options));
    }

    let missing: Vec<&str> = selected.iter().filter(|id| !emitted.contains(*id)).copied().collect();
    if !missing.is_empty() {
        tracing::warn!("selected test ids not found: {:?}", missing);
    }

    Ok(GeneratedScript {
        page_path: options.page_path.clone(),
        headless: options.headless,
        setup: vec![ScriptStep::Navigate {
            page_path: options.page_path.clone(),
        }],
        routines,
    })
}

/// Decode JSON inputs, then synthesize. Undecodable input is a `Structural` error.
pub fn synthesize_json(
    test_cases_json: &str,
    knowledge_json: &str,
    selected_ids: &[String],
    options: &SynthesisOptions,
) -> Result<GeneratedScript> {
    let batch: TestCaseBatch = serde_json::from_str(test_cases_json)
        .map_err(|e| QaError::structural("decoding test cases", e))?;
    let knowledge: KnowledgeBase = serde_json::from_str(knowledge_json)
        .map_err(|e| QaError::structural("decoding knowledge base", e))?;
    synthesize(&batch.test_cases, &knowledge, selected_ids, options)
}

fn build_routine(
    tc: &TestCase,
    name: String,
    knowledge: &KnowledgeBase,
    options: &SynthesisOptions,
) -> Routine {
    let mut steps = vec![ScriptStep::Log {
        message: format!("Executing {}", display_title(tc)),
    }];

    if let Some(warning) = &tc.validation_warning {
        steps.push(ScriptStep::Comment {
            text: warning.clone(),
        });
    }

    steps.extend(
        tc.used_elements
            .iter()
            .map(|reference| plan_interaction(reference, &knowledge.ui_elements)),
    );

    steps.push(ScriptStep::Wait {
        seconds: options.wait_seconds,
    });
    steps.push(ScriptStep::AssertionPlaceholder {
        expected: if tc.expected_result.trim().is_empty() {
            "Expected result".to_string()
        } else {
            tc.expected_result.clone()
        },
    });

    Routine {
        test_id: tc.test_id.clone(),
        name,
        title: display_title(tc).to_string(),
        steps,
    }
}

fn display_title(tc: &TestCase) -> &str {
    if tc.title.trim().is_empty() {
        &tc.test_id
    } else {
        &tc.title
    }
}

/// Routine name for a test id: `test_` + the id lower-cased with whitespace
/// removed and any other non-identifier character replaced by `_`.
pub fn routine_name(test_id: &str) -> String {
    let body: String = test_id
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if body.is_empty() {
        "test_case".to_string()
    } else {
        format!("test_{}", body)
    }
}

/// Distinct ids can sanitize to the same name; suffix later ones.
fn unique_name(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
