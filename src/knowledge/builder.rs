use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};
use crate::knowledge::html_parser::parse_html;
use crate::knowledge::knowledge_model::KnowledgeBase;

/// Extensions whose bytes are taken verbatim as requirement text.
pub const TEXT_EXTENSIONS: [&str; 6] = ["txt", "md", "markdown", "csv", "json", "rst"];

// ============================================================================
// Ingestion inputs and outputs
// ============================================================================

/// One uploaded file: its name (used for format detection) and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(filename: &str, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.to_string(),
            bytes: bytes.into(),
        }
    }

    /// Read a document from disk, keeping only the file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| QaError::io(format!("reading {}", path.display()), e))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { filename, bytes })
    }

    pub fn is_html(&self) -> bool {
        self.filename.to_ascii_lowercase().ends_with(".html")
    }

    fn extension(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// A document skipped because no text could be extracted from its format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedFormat {
    pub filename: String,
    pub extension: String,
}

/// Result of a successful ingestion: the knowledge base, the HTML page it was
/// parsed from, and any non-fatal skips.
#[derive(Debug, Clone)]
pub struct Ingestion {
    pub knowledge: KnowledgeBase,
    pub page: SourceDocument,
    pub skipped: Vec<UnsupportedFormat>,
}

// ============================================================================
// Builder
// ============================================================================

/// Build a knowledge base from one ingestion batch.
///
/// Exactly one HTML page is used; when several `.html` files are present the
/// last one wins. Text-like documents become requirement chunks in upload
/// order. Nothing is persisted here.
pub fn build_knowledge_base(documents: &[SourceDocument]) -> Result<Ingestion> {
    if documents.is_empty() {
        return Err(QaError::EmptyInput);
    }

    let mut requirements = Vec::new();
    let mut skipped = Vec::new();
    let mut page: Option<&SourceDocument> = None;

    for doc in documents {
        if doc.is_html() {
            if let Some(previous) = page {
                tracing::warn!(
                    "multiple HTML pages uploaded; '{}' replaces '{}'",
                    doc.filename,
                    previous.filename
                );
            }
            page = Some(doc);
            continue;
        }

        match extract_text(doc) {
            TextExtraction::Text(text) => requirements.push(text),
            TextExtraction::Empty => {
                tracing::debug!("skipping empty document '{}'", doc.filename);
            }
            TextExtraction::Unsupported(extension) => {
                tracing::warn!("unsupported file format '.{}' ({})", extension, doc.filename);
                skipped.push(UnsupportedFormat {
                    filename: doc.filename.clone(),
                    extension,
                });
            }
        }
    }

    let page = page.ok_or(QaError::MissingHtml)?;
    let html = String::from_utf8_lossy(&page.bytes);
    let ui_elements = parse_html(&html);

    if ui_elements.is_empty() {
        return Err(QaError::NoUiElements {
            filename: page.filename.clone(),
        });
    }

    tracing::info!(
        "built knowledge base: {} requirements, {} UI elements from '{}'",
        requirements.len(),
        ui_elements.len(),
        page.filename
    );

    Ok(Ingestion {
        knowledge: KnowledgeBase::new(requirements, ui_elements),
        page: page.clone(),
        skipped,
    })
}

enum TextExtraction {
    Text(String),
    Empty,
    Unsupported(String),
}

fn extract_text(doc: &SourceDocument) -> TextExtraction {
    let extension = doc.extension();
    if !TEXT_EXTENSIONS.contains(&extension.as_str()) {
        return TextExtraction::Unsupported(extension);
    }

    let text = String::from_utf8_lossy(&doc.bytes).into_owned();
    if text.trim().is_empty() {
        TextExtraction::Empty
    } else {
        TextExtraction::Text(text)
    }
}
