pub mod playwright;
pub mod resolver;
pub mod script_model;
pub mod selenium;
pub mod synthesizer;

use crate::error::{QaError, Result};
use crate::script::script_model::GeneratedScript;

/// Output flavor for a generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    Selenium,
    Playwright,
    /// The intermediate model itself, as JSON
    Json,
}

impl ScriptFormat {
    /// Parse a format name; unknown names fall back to Selenium.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "playwright" | "js" => ScriptFormat::Playwright,
            "json" => ScriptFormat::Json,
            _ => ScriptFormat::Selenium,
        }
    }

    /// Default output file name for this format.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ScriptFormat::Selenium => "generated_tests.py",
            ScriptFormat::Playwright => "generated.spec.js",
            ScriptFormat::Json => "generated_script.json",
        }
    }
}

pub fn render_script(script: &GeneratedScript, format: ScriptFormat) -> Result<String> {
    match format {
        ScriptFormat::Selenium => Ok(selenium::render_selenium(script)),
        ScriptFormat::Playwright => Ok(playwright::render_playwright(script)),
        ScriptFormat::Json => serde_json::to_string_pretty(script)
            .map_err(|e| QaError::structural("serializing script model", e)),
    }
}
