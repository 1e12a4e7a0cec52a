//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// CSV column mapping
    #[serde(default)]
    pub input: InputConfig,

    /// Acceptance threshold and stage limits
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// HTTP client settings shared by all stages
    #[serde(default)]
    pub http: HttpConfig,

    /// LLM fallback settings
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from a YAML (`.yaml`/`.yml`) or TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
            });

        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// Load and validate in one step, failing before any URL is touched.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.input.id_column.trim().is_empty() {
            return Err(AppError::validation("input.id_column is empty"));
        }
        if self.input.url_columns.is_empty() {
            return Err(AppError::validation("input.url_columns must not be empty"));
        }
        if self.input.url_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(AppError::validation("input.url_columns contains an empty column name"));
        }
        if self.extraction.min_text_length == 0 {
            return Err(AppError::validation("extraction.min_text_length must be > 0"));
        }
        if self.extraction.max_html_chars == 0 {
            return Err(AppError::validation("extraction.max_html_chars must be > 0"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.llm.model.trim().is_empty() {
            return Err(AppError::validation("llm.model is empty"));
        }
        if self.llm.api_key_env.trim().is_empty() {
            return Err(AppError::validation("llm.api_key_env is empty"));
        }
        Ok(())
    }
}

/// Which CSV columns carry the row id and the URLs.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Column whose value is copied into every result of the row
    #[serde(default = "defaults::id_column")]
    pub id_column: String,

    /// Columns holding URLs, processed left to right
    #[serde(default = "defaults::url_columns")]
    pub url_columns: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            id_column: defaults::id_column(),
            url_columns: defaults::url_columns(),
        }
    }
}

/// Stage acceptance settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Minimum number of characters for text to be accepted
    #[serde(default = "defaults::min_text_length")]
    pub min_text_length: usize,

    /// HTML is cut to this many characters before it goes into the LLM prompt
    #[serde(default = "defaults::max_html_chars")]
    pub max_html_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length: defaults::min_text_length(),
            max_html_chars: defaults::max_html_chars(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for page fetches
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// LLM provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Model identifier passed to the provider
    #[serde(default = "defaults::model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    /// REST root of the provider
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Sampling temperature
    #[serde(default = "defaults::temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: defaults::model(),
            api_key_env: defaults::api_key_env(),
            base_url: defaults::base_url(),
            temperature: defaults::temperature(),
        }
    }
}

mod defaults {
    // Input defaults
    pub fn id_column() -> String {
        "id".into()
    }
    pub fn url_columns() -> Vec<String> {
        vec!["url".into()]
    }

    // Extraction defaults
    pub fn min_text_length() -> usize {
        100
    }
    pub fn max_html_chars() -> usize {
        50_000
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; article-extractor/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // LLM defaults
    pub fn model() -> String {
        "gemini-1.5-flash".into()
    }
    pub fn api_key_env() -> String {
        "GEMINI_API_KEY".into()
    }
    pub fn base_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".into()
    }
    pub fn temperature() -> f32 {
        0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_id_column() {
        let mut config = Config::default();
        config.input.id_column = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_url_columns() {
        let mut config = Config::default();
        config.input.url_columns.clear();
        assert!(config.validate().is_err());

        config.input.url_columns = vec!["link".into(), "".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_threshold() {
        let mut config = Config::default();
        config.extraction.min_text_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_yaml_with_partial_sections() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "input:\n  id_column: article_id\n  url_columns: [primary_url, mirror_url]\nextraction:\n  min_text_length: 250\n"
        )
        .unwrap();

        let config = Config::load_validated(file.path()).unwrap();
        assert_eq!(config.input.id_column, "article_id");
        assert_eq!(config.input.url_columns, vec!["primary_url", "mirror_url"]);
        assert_eq!(config.extraction.min_text_length, 250);
        assert_eq!(config.extraction.max_html_chars, 50_000);
        assert_eq!(config.llm.model, "gemini-1.5-flash");
    }

    #[test]
    fn load_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[input]\nid_column = \"row\"\nurl_columns = [\"link\"]\n\n[llm]\nmodel = \"gemini-2.0-flash\"\n"
        )
        .unwrap();

        let config = Config::load_validated(file.path()).unwrap();
        assert_eq!(config.input.id_column, "row");
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn load_validated_fails_fast_on_bad_values() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "input:\n  id_column: id\n  url_columns: []\n").unwrap();

        let err = Config::load_validated(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
