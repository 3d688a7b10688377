use std::path::{Path, PathBuf};

use crate::cases::generator::generate_test_cases;
use crate::cases::llm::{
    DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL,
    GeminiBackend, LlmBackend, MockBackend, OllamaBackend,
};
use crate::cases::validator::validate_test_cases;
use crate::cli::config::{LlmSettings, ScriptSettings};
use crate::error::{QaError, Result};
use crate::knowledge::builder::{SourceDocument, build_knowledge_base};
use crate::knowledge::knowledge_model::KnowledgeBase;
use crate::knowledge::store::{FileStore, KnowledgeStore};
use crate::report::console::{format_case_report, format_knowledge_summary, format_script_summary};
use crate::script::synthesizer::{SynthesisOptions, synthesize};
use crate::script::{ScriptFormat, render_script};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{Stage, TraceEvent};

pub const TRACE_FILE: &str = "pipeline_trace.jsonl";

pub fn trace_path(store: &FileStore) -> PathBuf {
    store.dir().join(TRACE_FILE)
}

// ============================================================================
// ingest subcommand
// ============================================================================

/// Build and persist the knowledge base, keeping a copy of the HTML page.
/// Nothing is written when the batch is rejected.
pub fn cmd_ingest(store: &FileStore, files: &[String], tracer: &TraceLogger) -> Result<String> {
    let documents = files
        .iter()
        .map(|f| SourceDocument::from_path(Path::new(f)))
        .collect::<Result<Vec<_>>>()?;

    let ingestion = match build_knowledge_base(&documents) {
        Ok(i) => i,
        Err(e) => {
            tracer.log(&TraceEvent::now(Stage::Ingest).with_error(&e));
            return Err(e);
        }
    };

    store.save_knowledge(&ingestion.knowledge)?;
    let page_path = store.save_page(&ingestion.page.bytes)?;
    tracing::info!("saved page copy to {}", page_path.display());

    let summary = ingestion.knowledge.summary();
    let mut event = TraceEvent::now(Stage::Ingest)
        .with_fingerprint(&summary.fingerprint)
        .with_count("documents", documents.len())
        .with_count("requirements", summary.total_requirements)
        .with_count("ui_elements", summary.total_ui_elements);
    for skip in &ingestion.skipped {
        event = event.with_warning(format!("unsupported format: {}", skip.filename));
    }
    tracer.log(&event);

    Ok(format_knowledge_summary(&summary, &ingestion.skipped))
}

// ============================================================================
// generate-cases subcommand
// ============================================================================

pub fn cmd_generate_cases(store: &dyn KnowledgeStore, settings: &LlmSettings, tracer: &TraceLogger) -> Result<String> {
    let knowledge = store.load_knowledge()?;
    let backend = build_backend(settings, &knowledge)?;

    let batch = match generate_test_cases(backend.as_ref(), &knowledge) {
        Ok(b) => b,
        Err(e) => {
            tracer.log(
                &TraceEvent::now(Stage::Generate)
                    .with_fingerprint(knowledge.fingerprint())
                    .with_error(&e),
            );
            return Err(e);
        }
    };

    store.save_test_cases(&batch)?;

    tracer.log(
        &TraceEvent::now(Stage::Generate)
            .with_fingerprint(knowledge.fingerprint())
            .with_count("test_cases", batch.len())
            .with_count("ungrounded", batch.warned_count()),
    );

    Ok(format_case_report(&batch))
}

// ============================================================================
// validate subcommand
// ============================================================================

pub fn cmd_validate(store: &dyn KnowledgeStore, tracer: &TraceLogger) -> Result<String> {
    let knowledge = store.load_knowledge()?;
    let mut batch = store.load_test_cases()?;

    validate_test_cases(&mut batch.test_cases, &knowledge);
    store.save_test_cases(&batch)?;

    let mut event = TraceEvent::now(Stage::Validate)
        .with_fingerprint(knowledge.fingerprint())
        .with_count("test_cases", batch.len())
        .with_count("ungrounded", batch.warned_count());
    for tc in &batch.test_cases {
        if let Some(warning) = &tc.validation_warning {
            event = event.with_warning(format!("{}: {}", tc.test_id, warning));
        }
    }
    tracer.log(&event);

    Ok(format_case_report(&batch))
}

// ============================================================================
// generate-script subcommand
// ============================================================================

/// Synthesize and write a script for the selected ids (or all with `all`).
pub fn cmd_generate_script(
    store: &FileStore,
    ids: &[String],
    all: bool,
    settings: &ScriptSettings,
    tracer: &TraceLogger,
) -> Result<String> {
    let knowledge = store.load_knowledge()?;
    let batch = store.load_test_cases()?;

    let selected = if all { batch.ids() } else { ids.to_vec() };
    if selected.is_empty() {
        tracing::warn!("no test ids selected; the script will contain no test routines");
    }

    let options = SynthesisOptions {
        page_path: store.page_path().display().to_string(),
        wait_seconds: settings.wait_seconds,
        headless: settings.headless,
    };

    let script = synthesize(&batch.test_cases, &knowledge, &selected, &options)?;
    let format = ScriptFormat::from_name(&settings.format);
    let text = render_script(&script, format)?;

    let destination = settings
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| store.dir().join(format.default_file_name()));
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| QaError::io(format!("creating {}", parent.display()), e))?;
    }
    std::fs::write(&destination, &text)
        .map_err(|e| QaError::io(format!("writing {}", destination.display()), e))?;

    tracer.log(
        &TraceEvent::now(Stage::Synthesize)
            .with_fingerprint(knowledge.fingerprint())
            .with_count("selected", selected.len())
            .with_count("routines", script.routines.len())
            .with_count("unresolved", script.unresolved_count()),
    );

    Ok(format_script_summary(&script, &destination.display().to_string()))
}

// ============================================================================
// summary subcommand
// ============================================================================

pub fn cmd_summary(store: &dyn KnowledgeStore) -> Result<String> {
    let knowledge = store.load_knowledge()?;
    Ok(format_knowledge_summary(&knowledge.summary(), &[]))
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the LLM backend named in `settings`. Unknown names use the offline mock.
pub fn build_backend(settings: &LlmSettings, knowledge: &KnowledgeBase) -> Result<Box<dyn LlmBackend>> {
    match settings.backend.as_str() {
        "ollama" => {
            let endpoint = settings.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
            let model = settings.model.as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL);
            Ok(Box::new(OllamaBackend::new(endpoint, model)))
        }
        "gemini" => {
            let endpoint = settings.endpoint.as_deref().unwrap_or(DEFAULT_GEMINI_ENDPOINT);
            let model = settings.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
            Ok(Box::new(GeminiBackend::from_env(endpoint, model, &settings.api_key_env)?))
        }
        _ => Ok(Box::new(MockBackend::for_knowledge(knowledge))),
    }
}
