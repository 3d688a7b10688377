use serde::{Deserialize, Serialize};

/// One LLM-proposed test scenario.
///
/// `used_elements` holds element references (an id, name or visible text from
/// the knowledge base). `validation_warning` is attached by the grounding
/// validator and omitted from JSON when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub test_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub related_requirements: Vec<String>,

    #[serde(default)]
    pub used_elements: Vec<String>,

    #[serde(default)]
    pub preconditions: Vec<String>,

    #[serde(default)]
    pub steps: Vec<String>,

    #[serde(default)]
    pub expected_result: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_warning: Option<String>,
}

impl TestCase {
    pub fn new(test_id: &str, title: &str, used_elements: &[&str]) -> Self {
        Self {
            test_id: test_id.to_string(),
            title: title.to_string(),
            related_requirements: Vec::new(),
            used_elements: used_elements.iter().map(|e| e.to_string()).collect(),
            preconditions: Vec::new(),
            steps: Vec::new(),
            expected_result: String::new(),
            validation_warning: None,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.validation_warning.is_none()
    }
}

/// The `{"test_cases": [...]}` envelope exchanged with the LLM and the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TestCaseBatch {
    pub test_cases: Vec<TestCase>,
}

impl TestCaseBatch {
    pub fn new(test_cases: Vec<TestCase>) -> Self {
        Self { test_cases }
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }

    pub fn warned_count(&self) -> usize {
        self.test_cases.iter().filter(|tc| !tc.is_grounded()).count()
    }

    pub fn ids(&self) -> Vec<String> {
        self.test_cases.iter().map(|tc| tc.test_id.clone()).collect()
    }
}
