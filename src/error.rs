use thiserror::Error;

pub type Result<T> = std::result::Result<T, QaError>;

/// Fatal pipeline errors. Non-fatal conditions (skipped documents,
/// ungrounded references, unresolved elements) are carried as data instead.
#[derive(Debug, Error)]
pub enum QaError {
    /// Ingestion was called with no documents at all
    #[error("no documents supplied for ingestion")]
    EmptyInput,

    /// The ingestion batch has no `.html` document
    #[error("an HTML page (.html) is required but none was uploaded")]
    MissingHtml,

    /// The HTML page parsed, but contains none of the supported tags
    #[error("HTML page '{filename}' contains no input, button, select, textarea or link elements")]
    NoUiElements { filename: String },

    #[error("knowledge base not found at {path}; run ingestion first")]
    KnowledgeBaseNotFound { path: String },

    #[error("test cases not found at {path}; generate test cases first")]
    TestCasesNotFound { path: String },

    /// The LLM answered, but not with the expected `{"test_cases": [...]}` JSON
    #[error("LLM returned malformed test cases ({reason})")]
    GenerationFormat { reason: String, raw: String },

    /// The LLM transport itself failed (connection, HTTP status, envelope)
    #[error("LLM backend error: {0}")]
    Backend(String),

    /// Input records could not be decoded into the expected structure
    #[error("structural error ({context}): {source}")]
    Structural {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Knowledge base or batch is well-formed JSON but unusable
    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    #[error("I/O error ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl QaError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        QaError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn structural(context: impl Into<String>, source: serde_json::Error) -> Self {
        QaError::Structural {
            context: context.into(),
            source,
        }
    }

    /// Raw LLM output attached to a `GenerationFormat` error, for diagnosis and retry.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            QaError::GenerationFormat { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
