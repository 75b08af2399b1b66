use crate::core::export::EXPORT_FORMATS;
use crate::core::ConfigProvider;
use crate::domain::settings::{
    LlmSettings, ScraperSettings, DEFAULT_LLM_ENDPOINT, DEFAULT_LLM_MODEL,
};
use crate::utils::error::{KgError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_OUTPUT_PATH: &str = ".";
pub const DEFAULT_GRAPH_FILE: &str = "data/knowledge_graph.json";
pub const DEFAULT_ARCHIVE_NAME: &str = "kg_export.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub graph: GraphConfig,
    pub seeds: Option<SeedsConfig>,
    pub scraper: Option<ScraperConfig>,
    pub llm: Option<LlmConfig>,
    pub export: Option<ExportConfig>,
    pub monitoring: Option<MonitoringConfig>,

    #[serde(skip, default = "default_export_formats")]
    resolved_formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub output_path: Option<String>,
    pub graph_file: Option<String>,
    pub enrich: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedsConfig {
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub enabled: Option<bool>,
    pub base_url: Option<String>,
    pub url_patterns: Option<Vec<String>>,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub request_delay_ms: Option<u64>,
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub formats: Option<Vec<String>>,
    pub archive: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn default_export_formats() -> Vec<String> {
    vec!["json".to_string()]
}

fn env_var_regex() -> &'static regex::Regex {
    static ENV_VAR: OnceLock<regex::Regex> = OnceLock::new();
    ENV_VAR.get_or_init(|| regex::Regex::new(r"\$\{([^}]+)\}").expect("static env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(KgError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| KgError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        if let Some(formats) = config.export.as_ref().and_then(|e| e.formats.clone()) {
            config.resolved_formats = formats;
        }
        Ok(config)
    }

    /// 替換環境變數 (例如 ${OLLAMA_HOST})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_regex()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 命令列參數覆蓋檔案設定
    pub fn apply_overrides(&mut self, fast: bool, monitor: bool) {
        if fast {
            self.graph.enrich = Some(false);
        }
        if monitor {
            self.monitoring = Some(MonitoringConfig { enabled: true });
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn max_length(&self) -> usize {
        self.scraper
            .as_ref()
            .and_then(|s| s.max_length)
            .unwrap_or(crate::domain::settings::DEFAULT_MAX_DESCRIPTION_LENGTH)
    }

    fn llm_enabled(&self) -> bool {
        self.llm.as_ref().and_then(|l| l.enabled).unwrap_or(true)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("graph.output_path", self.output_path())?;
        validation::validate_path("graph.graph_file", self.graph_file_name())?;

        if let Some(path) = self.seed_file() {
            validation::validate_path("seeds.file", path)?;
        }

        let scraper = self.scraper_settings();
        validation::validate_url("scraper.base_url", &scraper.base_url)?;
        validation::validate_non_empty_string("scraper.user_agent", &scraper.user_agent)?;
        validation::validate_positive_number("scraper.max_length", scraper.max_length, 1)?;
        validation::validate_range("scraper.timeout_seconds", scraper.timeout.as_secs(), 1, 120)?;
        validation::validate_url_patterns("scraper.url_patterns", &scraper.url_patterns)?;

        if let Some(llm) = self.llm_settings() {
            validation::validate_url("llm.endpoint", &llm.endpoint)?;
            validation::validate_non_empty_string("llm.model", &llm.model)?;
        }

        validation::validate_allowed_values("export.formats", self.export_formats(), &EXPORT_FORMATS)?;
        validation::validate_path("export.archive", self.export_archive_name())?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        self.graph.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    fn graph_file_name(&self) -> &str {
        self.graph.graph_file.as_deref().unwrap_or(DEFAULT_GRAPH_FILE)
    }

    fn enrich(&self) -> bool {
        self.graph.enrich.unwrap_or(true)
    }

    fn seed_file(&self) -> Option<&str> {
        self.seeds.as_ref().and_then(|s| s.file.as_deref())
    }

    fn export_formats(&self) -> &[String] {
        &self.resolved_formats
    }

    fn export_archive_name(&self) -> &str {
        self.export
            .as_ref()
            .and_then(|e| e.archive.as_deref())
            .unwrap_or(DEFAULT_ARCHIVE_NAME)
    }

    fn scraper_settings(&self) -> ScraperSettings {
        let defaults = ScraperSettings::default();
        let Some(scraper) = &self.scraper else {
            return defaults;
        };

        ScraperSettings {
            enabled: scraper.enabled.unwrap_or(defaults.enabled),
            base_url: scraper.base_url.clone().unwrap_or(defaults.base_url),
            url_patterns: scraper.url_patterns.clone().unwrap_or(defaults.url_patterns),
            user_agent: scraper.user_agent.clone().unwrap_or(defaults.user_agent),
            timeout: scraper
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            request_delay: scraper
                .request_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_delay),
            max_length: self.max_length(),
        }
    }

    fn llm_settings(&self) -> Option<LlmSettings> {
        if !self.llm_enabled() {
            return None;
        }

        let defaults = LlmSettings::default();
        let llm = self.llm.as_ref();
        Some(LlmSettings {
            endpoint: llm
                .and_then(|l| l.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_LLM_ENDPOINT.to_string()),
            model: llm
                .and_then(|l| l.model.clone())
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            timeout: llm
                .and_then(|l| l.timeout_seconds)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_length: self.max_length(),
        })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("[graph]\n").unwrap();

        assert_eq!(config.output_path(), ".");
        assert_eq!(config.graph_file_name(), "data/knowledge_graph.json");
        assert!(config.enrich());
        assert_eq!(config.export_formats(), &["json".to_string()]);
        assert_eq!(config.scraper_settings(), ScraperSettings::default());
        assert_eq!(config.llm_settings().unwrap().model, "phi3");
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[graph]
output_path = "./build"
graph_file = "kg.json"
enrich = true

[seeds]
file = "seeds.toml"

[scraper]
base_url = "https://tutorials.example.com"
timeout_seconds = 10
request_delay_ms = 0
max_length = 250

[llm]
enabled = false

[export]
formats = ["json", "csv"]
archive = "bundle.zip"

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.output_path(), "./build");
        assert_eq!(config.graph_file_name(), "kg.json");
        assert_eq!(config.seed_file(), Some("seeds.toml"));
        assert_eq!(config.export_formats(), &["json".to_string(), "csv".to_string()]);
        assert_eq!(config.export_archive_name(), "bundle.zip");
        assert!(config.llm_settings().is_none());
        assert!(config.monitoring_enabled());

        let scraper = config.scraper_settings();
        assert_eq!(scraper.base_url, "https://tutorials.example.com");
        assert_eq!(scraper.timeout, Duration::from_secs(10));
        assert!(scraper.request_delay.is_zero());
        assert_eq!(scraper.max_length, 250);
        assert_eq!(scraper.url_patterns.len(), 6);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DSA_KG_TEST_LLM_HOST", "http://gpu-box:11434");

        let toml_content = r#"
[graph]

[llm]
endpoint = "${DSA_KG_TEST_LLM_HOST}"
model = "${DSA_KG_TEST_UNSET_MODEL}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let llm = config.llm_settings().unwrap();
        assert_eq!(llm.endpoint, "http://gpu-box:11434");
        assert_eq!(llm.model, "${DSA_KG_TEST_UNSET_MODEL}");

        std::env::remove_var("DSA_KG_TEST_LLM_HOST");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = TomlConfig::from_toml_str("[graph]\n[scraper]\nbase_url = \"not-a-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_format = TomlConfig::from_toml_str("[graph]\n[export]\nformats = [\"xml\"]\n").unwrap();
        assert!(bad_format.validate().is_err());

        let bad_pattern =
            TomlConfig::from_toml_str("[graph]\n[scraper]\nurl_patterns = [\"static/\"]\n").unwrap();
        assert!(bad_pattern.validate().is_err());

        assert!(TomlConfig::from_toml_str("[scraper]\n").is_err());
    }

    #[test]
    fn test_overrides_and_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[graph]\noutput_path = \"./out\"\n")
            .unwrap();

        let mut config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_path(), "./out");

        config.apply_overrides(true, true);
        assert!(!config.enrich());
        assert!(config.monitoring_enabled());
    }
}
