use serde::{Deserialize, Serialize};

// ============================================================================
// Knowledge base records
// ============================================================================

/// One interactive tag discovered in the ingested HTML page.
///
/// Serializes with every field present: optional attributes become `null`,
/// while `text` is always a string (empty when the element has no text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiElement {
    pub tag: String,
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "class")]
    pub class_list: Option<String>,
}

impl UiElement {
    /// Bare element of the given tag, no attributes, no text.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            name: None,
            input_type: None,
            text: String::new(),
            class_list: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_type(mut self, input_type: &str) -> Self {
        self.input_type = Some(input_type.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_class(mut self, class_list: &str) -> Self {
        self.class_list = Some(class_list.to_string());
        self
    }

    /// Every non-empty reference string this element answers to (id, name, text).
    pub fn reference_keys(&self) -> impl Iterator<Item = &str> {
        [self.id.as_deref(), self.name.as_deref(), Some(self.text.as_str())]
            .into_iter()
            .flatten()
            .filter(|key| !key.is_empty())
    }
}

/// Grounding corpus for one session: requirement text plus parsed UI elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KnowledgeBase {
    pub requirements: Vec<String>,
    pub ui_elements: Vec<UiElement>,
}

impl KnowledgeBase {
    pub fn new(requirements: Vec<String>, ui_elements: Vec<UiElement>) -> Self {
        Self {
            requirements,
            ui_elements,
        }
    }

    /// A knowledge base without UI elements can never resolve a selector.
    pub fn has_ui_elements(&self) -> bool {
        !self.ui_elements.is_empty()
    }

    pub fn summary(&self) -> KnowledgeSummary {
        KnowledgeSummary {
            total_requirements: self.requirements.len(),
            total_ui_elements: self.ui_elements.len(),
            fingerprint: self.fingerprint(),
        }
    }

    /// SHA-1 of the canonical JSON form. Stable across save/load cycles.
    pub fn fingerprint(&self) -> String {
        use sha1::{Digest, Sha1};

        let canonical = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha1::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Collapse runs of XML whitespace (space, tab, CR, LF) to one space and trim,
/// as XPath `normalize-space()` does. Non-breaking spaces are kept.
pub fn normalize_space(text: &str) -> String {
    text.split([' ', '\t', '\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Counts reported after ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSummary {
    pub total_requirements: usize,
    pub total_ui_elements: usize,
    pub fingerprint: String,
}
