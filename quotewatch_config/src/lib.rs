//! # Quotewatch Config
//!
//! Configuration system for the Quotewatch sourcing-metrics pipeline.
//!
//! Provides TOML-based configuration parsing and validation for logging,
//! reconciliation tuning, filter-rule extensions, NER and LLM model settings,
//! and batch pipeline behavior.
//!
//! # Configuration Schema
//!
//! The configuration file (`quotewatch.toml`) supports the following sections:
//! - `[logging]` — log level and output format
//! - `[reconciliation]` — fuzzy-match threshold and classifier tuning
//! - `[filters]` — additions to the built-in filtering rule sets
//! - `[ner]` — GLiNER ONNX model settings
//! - `[llm]` — chat API settings for the LLM source proposer
//! - `[pipeline]` — batch processing settings
//!
//! # Environment Variable Overrides
//!
//! Scalar fields can be overridden via environment variables using the
//! `QUOTEWATCH_` prefix and `_` as section separator:
//! - `QUOTEWATCH_LOGGING_LEVEL` → `logging.level`
//! - `QUOTEWATCH_RECONCILIATION_MATCH_THRESHOLD` → `reconciliation.match_threshold`
//! - `QUOTEWATCH_NER_MODEL_PATH` → `ner.model_path`
//! - `QUOTEWATCH_LLM_API_KEY_ENV` → `llm.api_key_env`
//! - etc.

use serde::{Deserialize, Serialize};

/// Top-level Quotewatch configuration.
///
/// Parsed from `quotewatch.toml` or constructed programmatically.
/// Environment variables with the `QUOTEWATCH_` prefix override TOML values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotewatchConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Reconciliation tuning.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    /// Filter-rule extensions.
    #[serde(default)]
    pub filters: FiltersConfig,
    /// GLiNER NER model settings.
    #[serde(default)]
    pub ner: NerConfig,
    /// LLM source-proposer settings.
    #[serde(default)]
    pub llm: LlmProposerConfig,
    /// Batch pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format: "text" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

/// Reconciliation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Fuzzy-match threshold on the 0-100 scale (default: 85).
    #[serde(default = "default_match_threshold")]
    pub match_threshold: u8,
    /// Treat unrecognized single-token names as non-persons (default: true).
    #[serde(default = "default_single_token_gender_gate")]
    pub single_token_gender_gate: bool,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            single_token_gender_gate: default_single_token_gender_gate(),
        }
    }
}

fn default_match_threshold() -> u8 {
    85
}
fn default_single_token_gender_gate() -> bool {
    true
}

/// Additions to the built-in filtering rule sets. Extensions merge into the
/// defaults; they never replace them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Extra brand/product substrings to treat as non-persons.
    #[serde(default)]
    pub extra_brands: Vec<String>,
    /// Extra title/role tokens for the normalizer to strip.
    #[serde(default)]
    pub extra_title_prefixes: Vec<String>,
    /// Extra place/institution suffixes for the classifier fallback.
    #[serde(default)]
    pub extra_place_suffixes: Vec<String>,
    /// Extra curated false-positive names for the quote policy.
    #[serde(default)]
    pub extra_denylist: Vec<String>,
    /// Path to a replacement first-name gender table (TSV). Empty means the
    /// embedded table.
    #[serde(default)]
    pub names_table: String,
}

/// GLiNER NER model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerConfig {
    /// Enable entity recognition in the classifier (default: false).
    #[serde(default)]
    pub enabled: bool,
    /// Path to the ONNX model file.
    #[serde(default = "default_ner_model_path")]
    pub model_path: String,
    /// Path to the tokenizer.json file.
    #[serde(default = "default_ner_tokenizer_path")]
    pub tokenizer_path: String,
    /// Minimum confidence score (default: 0.5).
    #[serde(default = "default_ner_threshold")]
    pub threshold: f32,
    /// Maximum candidate span width in words (default: 6).
    #[serde(default = "default_ner_max_width")]
    pub max_width: usize,
    /// Number of ONNX inference threads (default: 2).
    #[serde(default = "default_ner_num_threads")]
    pub num_threads: usize,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model_path: default_ner_model_path(),
            tokenizer_path: default_ner_tokenizer_path(),
            threshold: default_ner_threshold(),
            max_width: default_ner_max_width(),
            num_threads: default_ner_num_threads(),
        }
    }
}

fn default_ner_model_path() -> String {
    "models/gliner_small-v2.1/onnx/model.onnx".to_string()
}
fn default_ner_tokenizer_path() -> String {
    "models/gliner_small-v2.1/tokenizer.json".to_string()
}
fn default_ner_threshold() -> f32 {
    0.5
}
fn default_ner_max_width() -> usize {
    6
}
fn default_ner_num_threads() -> usize {
    2
}

/// LLM source-proposer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProposerConfig {
    /// Enable LLM source proposal (default: false).
    #[serde(default)]
    pub enabled: bool,
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_llm_api_base_url")]
    pub api_base_url: String,
    /// Name of the environment variable holding the API key. The actual key
    /// is read from this env var at runtime — never stored in config files.
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    /// Chat model name.
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Sampling temperature (default: 0.2).
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    /// Completion token budget (default: 1024).
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmProposerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base_url: default_llm_api_base_url(),
            api_key_env: default_llm_api_key_env(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_llm_api_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_llm_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}
fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}
fn default_llm_temperature() -> f32 {
    0.2
}
fn default_llm_max_tokens() -> u32 {
    1024
}
fn default_llm_timeout_secs() -> u64 {
    30
}

/// Batch pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum articles processed concurrently (default: 8).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    8
}

impl QuotewatchConfig {
    /// Load configuration from a TOML file, then apply environment variable overrides.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::parse_toml(&contents)
    }

    /// Parse configuration from a TOML string, apply env overrides, then validate.
    pub fn parse_toml(toml_str: &str) -> anyhow::Result<Self> {
        let mut config: QuotewatchConfig = toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Variables use the `QUOTEWATCH_` prefix with `_` as section separator:
    /// - `QUOTEWATCH_LOGGING_LEVEL` → `logging.level`
    /// - `QUOTEWATCH_LOGGING_FORMAT` → `logging.format`
    /// - `QUOTEWATCH_RECONCILIATION_MATCH_THRESHOLD` → `reconciliation.match_threshold`
    /// - `QUOTEWATCH_RECONCILIATION_SINGLE_TOKEN_GENDER_GATE` → `reconciliation.single_token_gender_gate`
    /// - `QUOTEWATCH_FILTERS_NAMES_TABLE` → `filters.names_table`
    /// - `QUOTEWATCH_NER_ENABLED` → `ner.enabled`
    /// - `QUOTEWATCH_NER_MODEL_PATH` → `ner.model_path`
    /// - `QUOTEWATCH_NER_TOKENIZER_PATH` → `ner.tokenizer_path`
    /// - `QUOTEWATCH_NER_THRESHOLD` → `ner.threshold`
    /// - `QUOTEWATCH_LLM_ENABLED` → `llm.enabled`
    /// - `QUOTEWATCH_LLM_API_BASE_URL` → `llm.api_base_url`
    /// - `QUOTEWATCH_LLM_API_KEY_ENV` → `llm.api_key_env`
    /// - `QUOTEWATCH_LLM_MODEL` → `llm.model`
    /// - `QUOTEWATCH_PIPELINE_CONCURRENCY` → `pipeline.concurrency`
    pub fn apply_env_overrides(&mut self) {
        // Logging overrides
        if let Ok(v) = std::env::var("QUOTEWATCH_LOGGING_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("QUOTEWATCH_LOGGING_FORMAT") {
            self.logging.format = v;
        }

        // Reconciliation overrides
        if let Ok(v) = std::env::var("QUOTEWATCH_RECONCILIATION_MATCH_THRESHOLD") {
            if let Ok(t) = v.parse::<u8>() {
                self.reconciliation.match_threshold = t;
            }
        }
        if let Ok(v) = std::env::var("QUOTEWATCH_RECONCILIATION_SINGLE_TOKEN_GENDER_GATE") {
            if let Ok(b) = v.parse::<bool>() {
                self.reconciliation.single_token_gender_gate = b;
            }
        }

        // Filters overrides
        if let Ok(v) = std::env::var("QUOTEWATCH_FILTERS_NAMES_TABLE") {
            self.filters.names_table = v;
        }

        // NER overrides
        if let Ok(v) = std::env::var("QUOTEWATCH_NER_ENABLED") {
            if let Ok(b) = v.parse::<bool>() {
                self.ner.enabled = b;
            }
        }
        if let Ok(v) = std::env::var("QUOTEWATCH_NER_MODEL_PATH") {
            self.ner.model_path = v;
        }
        if let Ok(v) = std::env::var("QUOTEWATCH_NER_TOKENIZER_PATH") {
            self.ner.tokenizer_path = v;
        }
        if let Ok(v) = std::env::var("QUOTEWATCH_NER_THRESHOLD") {
            if let Ok(t) = v.parse::<f32>() {
                self.ner.threshold = t;
            }
        }
        if let Ok(v) = std::env::var("QUOTEWATCH_NER_NUM_THREADS") {
            if let Ok(n) = v.parse::<usize>() {
                self.ner.num_threads = n;
            }
        }

        // LLM overrides
        if let Ok(v) = std::env::var("QUOTEWATCH_LLM_ENABLED") {
            if let Ok(b) = v.parse::<bool>() {
                self.llm.enabled = b;
            }
        }
        if let Ok(v) = std::env::var("QUOTEWATCH_LLM_API_BASE_URL") {
            self.llm.api_base_url = v;
        }
        if let Ok(v) = std::env::var("QUOTEWATCH_LLM_API_KEY_ENV") {
            self.llm.api_key_env = v;
        }
        if let Ok(v) = std::env::var("QUOTEWATCH_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("QUOTEWATCH_LLM_TIMEOUT_SECS") {
            if let Ok(t) = v.parse::<u64>() {
                self.llm.timeout_secs = t;
            }
        }

        // Pipeline overrides
        if let Ok(v) = std::env::var("QUOTEWATCH_PIPELINE_CONCURRENCY") {
            if let Ok(c) = v.parse::<usize>() {
                self.pipeline.concurrency = c;
            }
        }
    }

    /// Validate the configuration, returning a descriptive error on the
    /// first problem found.
    pub fn validate(&self) -> anyhow::Result<()> {
        // --- Logging validation ---
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "logging.level must be one of: {} (got '{}').",
                valid_log_levels.join(", "),
                self.logging.level
            );
        }
        let valid_log_formats = ["text", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!(
                "logging.format must be one of: {} (got '{}').",
                valid_log_formats.join(", "),
                self.logging.format
            );
        }

        // --- Reconciliation validation ---
        if self.reconciliation.match_threshold > 100 {
            anyhow::bail!(
                "reconciliation.match_threshold must be 0-100 (got {}).",
                self.reconciliation.match_threshold
            );
        }

        // --- NER validation ---
        if self.ner.enabled {
            if self.ner.model_path.is_empty() {
                anyhow::bail!("ner.model_path must not be empty when ner.enabled is true.");
            }
            if self.ner.tokenizer_path.is_empty() {
                anyhow::bail!("ner.tokenizer_path must not be empty when ner.enabled is true.");
            }
        }
        if !(0.0..=1.0).contains(&self.ner.threshold) {
            anyhow::bail!("ner.threshold must be 0.0-1.0 (got {}).", self.ner.threshold);
        }
        if self.ner.max_width == 0 {
            anyhow::bail!("ner.max_width must be > 0.");
        }
        if self.ner.num_threads == 0 {
            anyhow::bail!("ner.num_threads must be > 0.");
        }

        // --- LLM validation ---
        if self.llm.enabled {
            if self.llm.api_base_url.is_empty() {
                anyhow::bail!("llm.api_base_url must not be empty when llm.enabled is true.");
            }
            if self.llm.api_key_env.is_empty() {
                anyhow::bail!("llm.api_key_env must not be empty when llm.enabled is true.");
            }
            if self.llm.model.is_empty() {
                anyhow::bail!("llm.model must not be empty when llm.enabled is true.");
            }
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!("llm.temperature must be 0.0-2.0 (got {}).", self.llm.temperature);
        }
        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be > 0.");
        }

        // --- Pipeline validation ---
        if self.pipeline.concurrency == 0 {
            anyhow::bail!(
                "pipeline.concurrency must be > 0. Set via quotewatch.toml or QUOTEWATCH_PIPELINE_CONCURRENCY env var."
            );
        }

        Ok(())
    }

    /// Example TOML configuration with all defaults spelled out.
    pub fn example_toml() -> String {
        r##"# Quotewatch configuration

[logging]
level = "info"          # trace | debug | info | warn | error
format = "text"         # text | json

[reconciliation]
match_threshold = 85              # fuzzy same-person threshold, 0-100
single_token_gender_gate = true   # reject unrecognized single-token names

[filters]
# Additions merge into the built-in rule sets.
extra_brands = []
extra_title_prefixes = []
extra_place_suffixes = []
extra_denylist = []
# Path to a replacement first-name gender table (TSV). Empty = embedded table.
names_table = ""

[ner]
enabled = false
model_path = "models/gliner_small-v2.1/onnx/model.onnx"
tokenizer_path = "models/gliner_small-v2.1/tokenizer.json"
threshold = 0.5
max_width = 6
num_threads = 2

[llm]
enabled = false
api_base_url = "https://api.groq.com/openai/v1"
# Name of the env var holding the API key; the key itself never lives here.
api_key_env = "GROQ_API_KEY"
model = "llama-3.3-70b-versatile"
temperature = 0.2
max_tokens = 1024
timeout_secs = 30

[pipeline]
concurrency = 8
"##
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = QuotewatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reconciliation.match_threshold, 85);
        assert!(config.reconciliation.single_token_gender_gate);
        assert!(!config.ner.enabled);
        assert!(!config.llm.enabled);
        assert_eq!(config.pipeline.concurrency, 8);
    }

    #[test]
    fn empty_toml_parses_to_defaults() {
        let config = QuotewatchConfig::parse_toml("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.ner.threshold, 0.5);
    }

    #[test]
    fn example_toml_round_trips() {
        let config = QuotewatchConfig::parse_toml(&QuotewatchConfig::example_toml()).unwrap();
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.ner.max_width, 6);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = QuotewatchConfig::parse_toml(
            r#"
[reconciliation]
match_threshold = 90
"#,
        )
        .unwrap();
        assert_eq!(config.reconciliation.match_threshold, 90);
        assert!(config.reconciliation.single_token_gender_gate);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn filters_extensions_parse() {
        let config = QuotewatchConfig::parse_toml(
            r#"
[filters]
extra_brands = ["strongbow"]
extra_denylist = ["bournemouth echo"]
"#,
        )
        .unwrap();
        assert_eq!(config.filters.extra_brands, vec!["strongbow"]);
        assert_eq!(config.filters.extra_denylist, vec!["bournemouth echo"]);
        assert!(config.filters.extra_title_prefixes.is_empty());
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let result = QuotewatchConfig::parse_toml(
            r#"
[logging]
level = "verbose"
"#,
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("logging.level"));
    }

    #[test]
    fn enabled_ner_requires_model_paths() {
        let result = QuotewatchConfig::parse_toml(
            r#"
[ner]
enabled = true
model_path = ""
"#,
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ner.model_path"));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let result = QuotewatchConfig::parse_toml(
            r#"
[pipeline]
concurrency = 0
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_ner_threshold_is_rejected() {
        let result = QuotewatchConfig::parse_toml(
            r#"
[ner]
threshold = 1.5
"#,
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ner.threshold"));
    }
}
