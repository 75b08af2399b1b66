use crate::domain::settings::LlmSettings;
use crate::utils::error::{KgError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

pub fn build_prompt(concept_name: &str) -> String {
    format!(
        "Explain the data structure or algorithm '{}' in 3–4 concise academic sentences. \
         Include: definition, key idea, main operations, and typical use cases. No code.",
        concept_name
    )
}

/// Cuts `text` to `max_length` characters, marking the cut with `...`.
pub fn clip_with_ellipsis(text: &str, max_length: usize) -> String {
    if text.chars().count() > max_length {
        let mut clipped: String = text.chars().take(max_length).collect();
        clipped.push_str("...");
        clipped
    } else {
        text.to_string()
    }
}

/// Generates descriptions with a local Ollama model.
pub struct OllamaDescriptionSource {
    client: Client,
    settings: LlmSettings,
}

impl OllamaDescriptionSource {
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.settings.endpoint.trim_end_matches('/'))
    }

    async fn generate(&self, concept_name: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.settings.model,
            prompt: build_prompt(concept_name),
            stream: false,
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(KgError::ProcessingError {
                message: format!("LLM request failed with status: {}", response.status()),
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }

    pub async fn fetch(&self, concept_name: &str) -> Option<String> {
        tracing::info!("[LLM] Generating fallback description for '{}'", concept_name);
        match self.generate(concept_name).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(clip_with_ellipsis(text, self.settings.max_length))
                }
            }
            Err(e) => {
                tracing::warn!("[LLM] Error generating description: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn settings_for(endpoint: String, max_length: usize) -> LlmSettings {
        LlmSettings {
            endpoint,
            max_length,
            ..Default::default()
        }
    }

    #[test]
    fn test_clip_with_ellipsis() {
        assert_eq!(clip_with_ellipsis("abcdef", 3), "abc...");
        assert_eq!(clip_with_ellipsis("abc", 3), "abc");
    }

    #[tokio::test]
    async fn test_fetch_trims_and_clips_response() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .json_body_partial(r#"{"model": "phi3", "stream": false}"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"response": "  A heap is a tree-based priority structure.  "}));
        });

        let source = OllamaDescriptionSource::new(settings_for(server.base_url(), 6)).unwrap();
        let text = source.fetch("Heap").await;

        api_mock.assert();
        assert_eq!(text.as_deref(), Some("A heap..."));
    }

    #[tokio::test]
    async fn test_fetch_empty_or_failed_response_is_none() {
        let server = MockServer::start();
        let empty = server.mock(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(200).json_body(serde_json::json!({"response": "   "}));
        });

        let source = OllamaDescriptionSource::new(settings_for(server.base_url(), 400)).unwrap();
        assert!(source.fetch("Heap").await.is_none());
        empty.assert();

        let unreachable =
            OllamaDescriptionSource::new(settings_for("http://127.0.0.1:9".to_string(), 400)).unwrap();
        assert!(unreachable.fetch("Heap").await.is_none());
    }
}
