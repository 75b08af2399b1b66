//! Description sources used to enrich concepts during a build.
//!
//! Order of attempts for one concept:
//! 1. tutorial websites ([`web::WebDescriptionSource`])
//! 2. a local LLM ([`llm::OllamaDescriptionSource`]) when configured
//! 3. a generic sentence

pub mod html;
pub mod llm;
pub mod web;

use crate::core::{ConfigProvider, DescriptionOrigin, Describer};
use crate::utils::error::Result;
use async_trait::async_trait;
use llm::OllamaDescriptionSource;
use web::WebDescriptionSource;

pub fn generic_description(concept_name: &str) -> String {
    format!("A data structure or algorithm related to {}.", concept_name)
}

pub struct HybridDescriber {
    web: Option<WebDescriptionSource>,
    llm: Option<OllamaDescriptionSource>,
}

impl HybridDescriber {
    pub fn new(web: Option<WebDescriptionSource>, llm: Option<OllamaDescriptionSource>) -> Self {
        Self { web, llm }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let scraper = config.scraper_settings();
        let web = if scraper.enabled {
            Some(WebDescriptionSource::new(scraper)?)
        } else {
            tracing::info!("[SCRAPER] Web scraping disabled");
            None
        };

        let llm = match config.llm_settings() {
            Some(settings) => Some(OllamaDescriptionSource::new(settings)?),
            None => {
                tracing::info!("[LLM] Local model not configured, skipping LLM fallback");
                None
            }
        };

        Ok(Self::new(web, llm))
    }
}

#[async_trait]
impl Describer for HybridDescriber {
    async fn describe(&self, concept_name: &str) -> (String, DescriptionOrigin) {
        tracing::info!("[SCRAPER] Fetching description for: {}", concept_name);

        if let Some(web) = &self.web {
            if let Some(text) = web.fetch(concept_name).await {
                return (text, DescriptionOrigin::Web);
            }
            tracing::info!("[SCRAPER] ❌ No web description for '{}'", concept_name);
        }

        if let Some(llm) = &self.llm {
            if let Some(text) = llm.fetch(concept_name).await {
                tracing::info!("[SCRAPER] ✔ LLM description OK for '{}'", concept_name);
                return (text, DescriptionOrigin::Llm);
            }
        }

        tracing::warn!("[SCRAPER] ⚠ Using generic fallback for '{}'", concept_name);
        (generic_description(concept_name), DescriptionOrigin::Fallback)
    }
}
