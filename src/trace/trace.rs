use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Pipeline stage a trace event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Ingest,
    Generate,
    Validate,
    Synthesize,
}

#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub stage: Stage,

    pub knowledge_fingerprint: Option<String>,

    /// Stage-specific counters, e.g. `("ui_elements", 5)`
    pub counts: Vec<(String, usize)>,

    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn now(stage: Stage) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            stage,
            knowledge_fingerprint: None,
            counts: vec![],
            warnings: vec![],
            error: None,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: impl ToString) -> Self {
        self.knowledge_fingerprint = Some(fingerprint.to_string());
        self
    }

    pub fn with_count(mut self, key: &str, value: usize) -> Self {
        self.counts.push((key.to_string(), value));
        self
    }

    pub fn with_warning(mut self, warning: impl ToString) -> Self {
        self.warnings.push(warning.to_string());
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
