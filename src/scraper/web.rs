use crate::domain::settings::ScraperSettings;
use crate::scraper::html::extract_paragraph;
use crate::utils::error::Result;
use reqwest::Client;
use reqwest::StatusCode;

/// URL-friendly form of a concept name: lower-case, separators turned into
/// single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = name.trim().to_lowercase().replace(|c: char| matches!(c, ' ' | '_' | '/'), "-");
    while slug.contains("--") {
        slug = slug.replace("--", "-");
    }
    slug
}

/// 依序產生要嘗試的教學頁網址
pub fn candidate_urls(settings: &ScraperSettings, concept_name: &str) -> Vec<String> {
    let slug = slugify(concept_name);
    let base = settings.base_url.trim_end_matches('/');
    settings
        .url_patterns
        .iter()
        .map(|pattern| format!("{}/{}", base, pattern.replace("{slug}", &slug)))
        .collect()
}

/// Scrapes a short description from tutorial websites.
pub struct WebDescriptionSource {
    client: Client,
    settings: ScraperSettings,
}

impl WebDescriptionSource {
    pub fn new(settings: ScraperSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ScraperSettings {
        &self.settings
    }

    async fn try_url(&self, url: &str, concept_name: &str) -> Result<Option<String>> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            tracing::debug!("[SCRAPER] Status {} for {}", response.status(), url);
            return Ok(None);
        }

        let body = response.text().await?;
        Ok(extract_paragraph(&body, concept_name, self.settings.max_length))
    }

    /// First paragraph found over the candidate URLs. Request failures are
    /// logged and the next candidate is tried.
    pub async fn fetch(&self, concept_name: &str) -> Option<String> {
        for url in candidate_urls(&self.settings, concept_name) {
            tracing::debug!("[SCRAPER] Trying: {}", url);
            match self.try_url(&url, concept_name).await {
                Ok(Some(paragraph)) => {
                    tracing::info!("[SCRAPER] ✔ Found description for '{}'", concept_name);
                    if !self.settings.request_delay.is_zero() {
                        tokio::time::sleep(self.settings.request_delay).await;
                    }
                    return Some(paragraph);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("[SCRAPER] Error fetching {}: {}", url, e),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn settings_for(base_url: String) -> ScraperSettings {
        ScraperSettings {
            base_url,
            request_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Binary Search Tree "), "binary-search-tree");
        assert_eq!(slugify("union_find"), "union-find");
        assert_eq!(slugify("Bellman - Ford"), "bellman-ford");
        assert_eq!(slugify("a//b"), "a-b");
    }

    #[test]
    fn test_candidate_urls_order() {
        let settings = settings_for("https://www.geeksforgeeks.org/".to_string());
        let urls = candidate_urls(&settings, "Hash Table");
        assert_eq!(
            urls,
            vec![
                "https://www.geeksforgeeks.org/hash-table-data-structure/",
                "https://www.geeksforgeeks.org/hash-table-in-data-structure/",
                "https://www.geeksforgeeks.org/hash-table-algorithm/",
                "https://www.geeksforgeeks.org/hash-table/",
                "https://www.geeksforgeeks.org/hash-table-in-c/",
                "https://www.geeksforgeeks.org/hash-table-in-cpp/",
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_skips_failed_candidates() {
        let server = MockServer::start();
        let paragraph = "A queue is a linear structure that serves elements in first-in first-out order for scheduling.";

        let first = server.mock(|when, then| {
            when.method(GET).path("/queue-data-structure/");
            then.status(404);
        });
        let second = server.mock(|when, then| {
            when.method(GET).path("/queue-in-data-structure/");
            then.status(200)
                .header("Content-Type", "text/html")
                .body(format!("<html><body><p>{}</p></body></html>", paragraph));
        });

        let source = WebDescriptionSource::new(settings_for(server.base_url())).unwrap();
        let result = source.fetch("Queue").await;

        first.assert();
        second.assert();
        assert_eq!(result.as_deref(), Some(paragraph));
    }

    #[tokio::test]
    async fn test_fetch_returns_none_when_nothing_usable() {
        let server = MockServer::start();
        let pages = server.mock(|when, then| {
            when.method(GET);
            then.status(200).body("<p>too short</p>");
        });

        let source = WebDescriptionSource::new(settings_for(server.base_url())).unwrap();
        assert!(source.fetch("Stack").await.is_none());
        pages.assert_hits(6);
    }
}
