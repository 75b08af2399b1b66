use crate::domain::model::{BaseConcept, BuildResult, DescriptionOrigin};
use crate::domain::settings::{LlmSettings, ScraperSettings};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Directory every build artifact is written under.
    fn output_path(&self) -> &str;
    /// Graph file, relative to `output_path`.
    fn graph_file_name(&self) -> &str;
    fn enrich(&self) -> bool;
    fn seed_file(&self) -> Option<&str>;
    fn export_formats(&self) -> &[String];
    fn export_archive_name(&self) -> &str;
    fn scraper_settings(&self) -> ScraperSettings;
    fn llm_settings(&self) -> Option<LlmSettings>;
}

/// Produces a description for a concept name.
#[async_trait]
pub trait Describer: Send + Sync {
    async fn describe(&self, concept_name: &str) -> (String, DescriptionOrigin);
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<BaseConcept>>;
    async fn transform(&self, seeds: Vec<BaseConcept>) -> Result<BuildResult>;
    async fn load(&self, result: BuildResult) -> Result<String>;
}
