use crate::cases::case_model::TestCaseBatch;
use crate::knowledge::builder::UnsupportedFormat;
use crate::knowledge::knowledge_model::KnowledgeSummary;
use crate::script::script_model::GeneratedScript;

// ============================================================================
// Pipeline stage summaries for the terminal
// ============================================================================

/// Summary printed after ingestion.
pub fn format_knowledge_summary(summary: &KnowledgeSummary, skipped: &[UnsupportedFormat]) -> String {
    let mut out = String::new();

    out.push_str("=== Knowledge Base ===\n");
    out.push_str(&format!("  requirements: {}\n", summary.total_requirements));
    out.push_str(&format!("  ui elements:  {}\n", summary.total_ui_elements));
    out.push_str(&format!("  fingerprint:  {}\n", summary.fingerprint));

    for skip in skipped {
        out.push_str(&format!(
            "  [SKIPPED] {} (unsupported format '.{}')\n",
            skip.filename, skip.extension
        ));
    }

    out
}

/// Format a validated test-case batch for terminal output.
///
/// Produces output like:
/// ```text
/// === Test Cases ===
///
/// ✓ TC_001  Pay with valid details (3 elements)
/// ⚠ TC_002  Apply discount code (1 elements)
///     Invalid elements referenced: ["discountCode"]
///
/// === 1 grounded, 1 with warnings (2 total) ===
/// ```
pub fn format_case_report(batch: &TestCaseBatch) -> String {
    let mut out = String::from("=== Test Cases ===\n\n");

    for tc in &batch.test_cases {
        let marker = if tc.is_grounded() { "\u{2713}" } else { "\u{26a0}" };
        out.push_str(&format!(
            "{} {}  {} ({} elements)\n",
            marker,
            tc.test_id,
            tc.title,
            tc.used_elements.len()
        ));

        if let Some(ref warning) = tc.validation_warning {
            out.push_str(&format!("    {}\n", warning));
        }
    }

    let warned = batch.warned_count();
    out.push_str(&format!(
        "\n=== {} grounded, {} with warnings ({} total) ===\n",
        batch.len() - warned,
        warned,
        batch.len()
    ));

    out
}

/// One-line summary of a generated script.
pub fn format_script_summary(script: &GeneratedScript, destination: &str) -> String {
    format!(
        "Generated {} routines ({} unresolved element references) -> {}\n",
        script.routines.len(),
        script.unresolved_count(),
        destination
    )
}
