use std::time::Duration;

pub const DEFAULT_SCRAPE_BASE_URL: &str = "https://www.geeksforgeeks.org";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120 Safari/537.36";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 6;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_DESCRIPTION_LENGTH: usize = 400;
pub const DEFAULT_LLM_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_LLM_MODEL: &str = "phi3";

/// Suffixes tried, in order, after `{base_url}/{slug}`.
pub const DEFAULT_URL_PATTERNS: [&str; 6] = [
    "{slug}-data-structure/",
    "{slug}-in-data-structure/",
    "{slug}-algorithm/",
    "{slug}/",
    "{slug}-in-c/",
    "{slug}-in-cpp/",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ScraperSettings {
    pub enabled: bool,
    pub base_url: String,
    pub url_patterns: Vec<String>,
    pub user_agent: String,
    pub timeout: Duration,
    pub request_delay: Duration,
    pub max_length: usize,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_SCRAPE_BASE_URL.to_string(),
            url_patterns: DEFAULT_URL_PATTERNS.iter().map(|p| p.to_string()).collect(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            max_length: DEFAULT_MAX_DESCRIPTION_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    pub max_length: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            timeout: Duration::from_secs(60),
            max_length: DEFAULT_MAX_DESCRIPTION_LENGTH,
        }
    }
}
