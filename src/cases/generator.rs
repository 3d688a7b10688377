use crate::cases::case_model::{TestCase, TestCaseBatch};
use crate::cases::llm::LlmBackend;
use crate::cases::validator::validate_test_cases;
use crate::error::{QaError, Result};
use crate::knowledge::knowledge_model::{KnowledgeBase, UiElement};

/// Upper bound on "leave one field empty" cases drafted offline.
const MAX_NEGATIVE_DRAFTS: usize = 5;

// ============================================================================
// Generation pipeline
// ============================================================================

/// Ask the LLM for test cases grounded in `knowledge`, parse the answer and
/// attach grounding warnings.
pub fn generate_test_cases(backend: &dyn LlmBackend, knowledge: &KnowledgeBase) -> Result<TestCaseBatch> {
    let prompt = build_prompt(knowledge)?;
    tracing::info!("requesting test cases from {} backend", backend.name());

    let raw = backend.complete(&prompt)?;
    let mut batch = parse_generation(&raw)?;
    validate_test_cases(&mut batch.test_cases, knowledge);

    tracing::info!(
        "generated {} test cases ({} with ungrounded references)",
        batch.len(),
        batch.warned_count()
    );
    Ok(batch)
}

/// Build the grounding prompt: the full knowledge base plus the output schema.
pub fn build_prompt(knowledge: &KnowledgeBase) -> Result<String> {
    let knowledge_json = serde_json::to_string_pretty(knowledge)
        .map_err(|e| QaError::structural("serializing knowledge base for prompt", e))?;

    Ok(format!(
        r##"You are a QA engineer writing functional test cases for a web page.

Use ONLY the knowledge base below. Do not invent fields, buttons, features or behaviors.

KNOWLEDGE BASE:
{knowledge}

RULES:
1. Reference UI elements only from "ui_elements", by their exact id, name or text.
2. Reference requirements only from "requirements".
3. Cover positive paths, validation failures and edge cases the requirements describe.

Return ONLY valid JSON matching this exact schema:
{{
  "test_cases": [
    {{
      "test_id": "TC_001",
      "title": "Short but clear test title",
      "related_requirements": ["R1"],
      "used_elements": ["emailInput"],
      "preconditions": ["User is on the page"],
      "steps": ["Enter a valid email into 'emailInput'", "Click 'payNowButton'"],
      "expected_result": "What the page shows afterwards"
    }}
  ]
}}

Respond with ONLY valid JSON, no Markdown, no explanation."##,
        knowledge = knowledge_json,
    ))
}

/// Parse raw LLM output as a `{"test_cases": [...]}` batch.
///
/// A surrounding Markdown code fence is tolerated. Anything else that does
/// not decode is a `GenerationFormat` error carrying the raw text.
pub fn parse_generation(raw: &str) -> Result<TestCaseBatch> {
    let body = strip_code_fence(raw);

    if body.is_empty() {
        return Err(QaError::GenerationFormat {
            reason: "empty response".to_string(),
            raw: raw.to_string(),
        });
    }

    serde_json::from_str::<TestCaseBatch>(body).map_err(|e| QaError::GenerationFormat {
        reason: e.to_string(),
        raw: raw.to_string(),
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening fence line.
    let body = after_open.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

// ============================================================================
// Offline drafting
// ============================================================================

/// Draft test cases straight from the knowledge base, without an LLM.
///
/// Produces one happy-path case that fills every field and activates the
/// primary action, plus one "field left empty" case per field (capped).
pub fn draft_test_cases(knowledge: &KnowledgeBase) -> TestCaseBatch {
    let fields: Vec<&str> = knowledge
        .ui_elements
        .iter()
        .filter(|el| is_fillable(el))
        .filter_map(primary_reference)
        .collect();

    let action = knowledge
        .ui_elements
        .iter()
        .filter(|el| is_activatable(el))
        .filter_map(primary_reference)
        .next();

    let related: Vec<String> = if knowledge.requirements.is_empty() {
        Vec::new()
    } else {
        vec!["R1".to_string()]
    };

    let with_action = |mut used: Vec<String>| {
        if let Some(a) = action {
            used.push(a.to_string());
        }
        used
    };

    let mut cases = Vec::new();

    let happy_used = with_action(fields.iter().map(|f| f.to_string()).collect());
    cases.push(TestCase {
        test_id: "TC_001".to_string(),
        title: "Submit the form with valid data".to_string(),
        related_requirements: related.clone(),
        steps: describe_steps(&happy_used, action),
        used_elements: happy_used,
        preconditions: vec!["User is on the page".to_string()],
        expected_result: "The submission is accepted".to_string(),
        validation_warning: None,
    });

    for (i, skipped) in fields.iter().take(MAX_NEGATIVE_DRAFTS).enumerate() {
        let used = with_action(
            fields
                .iter()
                .filter(|f| *f != skipped)
                .map(|f| f.to_string())
                .collect(),
        );
        cases.push(TestCase {
            test_id: format!("TC_{:03}", i + 2),
            title: format!("Validation when '{}' is left empty", skipped),
            related_requirements: related.clone(),
            steps: describe_steps(&used, action),
            used_elements: used,
            preconditions: vec!["User is on the page".to_string()],
            expected_result: format!("A validation message is shown for '{}'", skipped),
            validation_warning: None,
        });
    }

    TestCaseBatch::new(cases)
}

fn describe_steps(used: &[String], action: Option<&str>) -> Vec<String> {
    used.iter()
        .map(|reference| {
            if Some(reference.as_str()) == action {
                format!("Click '{}'", reference)
            } else {
                format!("Enter a valid value into '{}'", reference)
            }
        })
        .collect()
}

fn primary_reference(el: &UiElement) -> Option<&str> {
    el.reference_keys().next()
}

fn is_fillable(el: &UiElement) -> bool {
    match el.tag.as_str() {
        "textarea" | "select" => true,
        "input" => !matches!(
            el.input_type.as_deref(),
            Some("submit" | "button" | "reset" | "image" | "hidden" | "file")
        ),
        _ => false,
    }
}

fn is_activatable(el: &UiElement) -> bool {
    el.tag == "button"
        || (el.tag == "input" && matches!(el.input_type.as_deref(), Some("submit" | "button")))
}

