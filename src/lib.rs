use crate::{
    cases::{case_model::TestCaseBatch, generator::generate_test_cases, llm::LlmBackend},
    error::Result,
    knowledge::{
        builder::{SourceDocument, UnsupportedFormat, build_knowledge_base},
        knowledge_model::KnowledgeBase,
        store::KnowledgeStore,
    },
    script::{
        script_model::GeneratedScript,
        synthesizer::{SynthesisOptions, synthesize},
    },
};

pub mod cases;
pub mod cli;
pub mod error;
pub mod knowledge;
pub mod report;
pub mod script;
pub mod trace;

/// Everything one end-to-end pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub knowledge: KnowledgeBase,
    pub skipped: Vec<UnsupportedFormat>,
    pub test_cases: TestCaseBatch,
    pub script: GeneratedScript,
}

/// Ingest → generate → validate → synthesize, persisting the knowledge base
/// and test cases in `store` along the way.
///
/// `selected_ids = None` selects every generated test case.
pub fn run_pipeline(
    store: &dyn KnowledgeStore,
    documents: &[SourceDocument],
    backend: &dyn LlmBackend,
    selected_ids: Option<&[String]>,
    options: &SynthesisOptions,
) -> Result<PipelineOutput> {
    let ingestion = build_knowledge_base(documents)?;
    store.save_knowledge(&ingestion.knowledge)?;

    let knowledge = store.load_knowledge()?;
    let test_cases = generate_test_cases(backend, &knowledge)?;
    store.save_test_cases(&test_cases)?;

    let selected = match selected_ids {
        Some(ids) => ids.to_vec(),
        None => test_cases.ids(),
    };
    let script = synthesize(&test_cases.test_cases, &knowledge, &selected, options)?;

    Ok(PipelineOutput {
        knowledge,
        skipped: ingestion.skipped,
        test_cases,
        script,
    })
}
