use serde::{Deserialize, Serialize};

use crate::cases::generator::draft_test_cases;
use crate::error::{QaError, Result};
use crate::knowledge::knowledge_model::KnowledgeBase;

// ============================================================================
// LlmBackend trait: text prompt in, text out
// ============================================================================

/// Blocking text completion. One call per generation request, no retries.
pub trait LlmBackend {
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Short name for logs and traces.
    fn name(&self) -> &str;
}

// ============================================================================
// Ollama Backend
// ============================================================================

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:1.5b";

pub struct OllamaBackend {
    pub endpoint: String,
    pub model: String,
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'static str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        }
    }
}

impl LlmBackend for OllamaBackend {
    fn complete(&self, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
        };

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| QaError::Backend(format!("ollama request to {} failed: {}", self.endpoint, e)))?;

        let body: OllamaResponse = response
            .json()
            .map_err(|e| QaError::Backend(format!("unexpected ollama response: {}", e)))?;
        Ok(body.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

// ============================================================================
// Gemini Backend
// ============================================================================

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiBackend {
    pub endpoint: String,
    pub model: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiBackend {
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Read the API key from the named environment variable.
    pub fn from_env(endpoint: &str, model: &str, key_var: &str) -> Result<Self> {
        let api_key = std::env::var(key_var)
            .map_err(|_| QaError::Backend(format!("environment variable {} is not set", key_var)))?;
        Ok(Self::new(endpoint, model, &api_key))
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint, self.model)
    }
}

impl LlmBackend for GeminiBackend {
    fn complete(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| QaError::Backend(format!("gemini request failed: {}", e)))?;

        let body: GeminiResponse = response
            .json()
            .map_err(|e| QaError::Backend(format!("unexpected gemini response: {}", e)))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .ok_or_else(|| QaError::Backend("gemini returned no candidates".to_string()))?;
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ============================================================================
// Offline backends
// ============================================================================

/// Deterministic offline backend: answers every prompt with test cases drafted
/// directly from a knowledge base, serialized as the LLM would.
pub struct MockBackend {
    response: String,
}

impl MockBackend {
    pub fn for_knowledge(knowledge: &KnowledgeBase) -> Self {
        let batch = draft_test_cases(knowledge);
        Self {
            response: serde_json::to_string_pretty(&batch).unwrap_or_default(),
        }
    }
}

impl LlmBackend for MockBackend {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Replays a fixed response (or failure), for exercising response handling.
pub struct CannedBackend {
    response: std::result::Result<String, String>,
}

impl CannedBackend {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
        }
    }
}

impl LlmBackend for CannedBackend {
    fn complete(&self, _prompt: &str) -> Result<String> {
        self.response.clone().map_err(QaError::Backend)
    }

    fn name(&self) -> &str {
        "canned"
    }
}
