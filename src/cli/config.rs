use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "grounded-qa.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "grounded-qa",
    version,
    about = "Knowledge-grounded test case and browser script generator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: grounded-qa.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Directory holding the knowledge base, test cases and page copy
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the knowledge base from support documents and one HTML page
    Ingest {
        /// Files to ingest (.txt/.md/... documents and exactly one .html page)
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Ask the LLM for test cases grounded in the knowledge base
    GenerateCases {
        /// LLM backend: mock, ollama or gemini
        #[arg(long)]
        backend: Option<String>,

        /// Backend endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Backend model name
        #[arg(long)]
        model: Option<String>,
    },

    /// Re-check stored test cases against the current knowledge base
    Validate,

    /// Render selected test cases into a browser automation script
    GenerateScript {
        /// Test case id to include (repeatable)
        #[arg(long = "id")]
        ids: Vec<String>,

        /// Include every stored test case
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Output format: selenium, playwright or json
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: <data-dir>/<format default name>)
        #[arg(short, long)]
        output: Option<String>,

        /// Run the browser headless
        #[arg(long, action = clap::ArgAction::Set)]
        headless: Option<bool>,

        /// Seconds to pause after each test's interactions
        #[arg(long)]
        wait_seconds: Option<u64>,
    },

    /// Print counts for the current knowledge base
    Summary,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `grounded-qa.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub script: ScriptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_backend")]
    pub backend: String,

    pub endpoint: Option<String>,
    pub model: Option<String>,

    /// Environment variable holding the Gemini API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoint: None,
            model: None,
            api_key_env: default_api_key_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    #[serde(default = "default_format")]
    pub format: String,

    pub output: Option<String>,

    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_wait_seconds")]
    pub wait_seconds: u64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output: None,
            headless: false,
            wait_seconds: default_wait_seconds(),
        }
    }
}

// Serde default helpers
fn default_data_dir() -> String { "data".to_string() }
fn default_backend() -> String { "mock".to_string() }
fn default_api_key_env() -> String { "GEMINI_API_KEY".to_string() }
fn default_format() -> String { "selenium".to_string() }
fn default_wait_seconds() -> u64 { 2 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed config {}: {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Resolved settings (CLI > config file > defaults)
// ============================================================================

/// LLM settings after merging CLI flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub backend: String,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key_env: String,
}

pub fn resolve_llm_settings(
    config: &LlmConfig,
    backend: Option<&str>,
    endpoint: Option<&str>,
    model: Option<&str>,
) -> LlmSettings {
    LlmSettings {
        backend: backend.unwrap_or(&config.backend).to_string(),
        endpoint: endpoint.map(str::to_string).or_else(|| config.endpoint.clone()),
        model: model.map(str::to_string).or_else(|| config.model.clone()),
        api_key_env: config.api_key_env.clone(),
    }
}

/// Script settings after merging CLI flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSettings {
    pub format: String,
    pub output: Option<String>,
    pub headless: bool,
    pub wait_seconds: u64,
}

pub fn resolve_script_settings(
    config: &ScriptConfig,
    format: Option<&str>,
    output: Option<&str>,
    headless: Option<bool>,
    wait_seconds: Option<u64>,
) -> ScriptSettings {
    ScriptSettings {
        format: format.unwrap_or(&config.format).to_string(),
        output: output.map(str::to_string).or_else(|| config.output.clone()),
        headless: headless.unwrap_or(config.headless),
        wait_seconds: wait_seconds.unwrap_or(config.wait_seconds),
    }
}

pub fn resolve_data_dir(config: &AppConfig, cli_data_dir: Option<&str>) -> String {
    cli_data_dir
        .map(str::to_string)
        .unwrap_or_else(|| config.storage.data_dir.clone())
}
