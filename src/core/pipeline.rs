use crate::core::export::{export_archive, ExportManifest};
use crate::core::relations::{concept_id, generate_auto_relations, generate_use_cases};
use crate::core::{
    BaseConcept, BuildReport, BuildResult, ConceptNode, ConfigProvider, DescriptionOrigin,
    Describer, KnowledgeGraph, Pipeline, Storage,
};
use crate::data::{base_concepts, load_seed_file};
use crate::utils::error::Result;
use chrono::Utc;
use std::path::Path;

/// Builds the knowledge graph: seeds in, enriched graph JSON (and optional
/// export archive) out.
pub struct GraphPipeline<S: Storage, C: ConfigProvider, D: Describer> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) describer: D,
}

impl<S: Storage, C: ConfigProvider, D: Describer> GraphPipeline<S, C, D> {
    pub fn new(storage: S, config: C, describer: D) -> Self {
        Self {
            storage,
            config,
            describer,
        }
    }

    async fn enrich_node(&self, seed: BaseConcept) -> (String, ConceptNode, DescriptionOrigin) {
        let key = seed.key.clone();
        let relations = generate_auto_relations(&key, &seed.category);

        let mut node = ConceptNode::from(seed);
        let origin = if self.config.enrich() {
            let (description, origin) = self.describer.describe(&node.name).await;
            node.description = description;
            origin
        } else {
            DescriptionOrigin::Seed
        };

        node.relations = relations;
        node.use_cases = generate_use_cases(&key);
        node.id = concept_id(&key);
        (key, node, origin)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, D: Describer> Pipeline for GraphPipeline<S, C, D> {
    async fn extract(&self) -> Result<Vec<BaseConcept>> {
        let seeds = match self.config.seed_file() {
            Some(path) => {
                tracing::info!("🌱 Loading seed concepts from: {}", path);
                load_seed_file(path).await?
            }
            None => base_concepts(),
        };

        tracing::info!("📥 Loaded {} seed concepts", seeds.len());
        Ok(seeds)
    }

    async fn transform(&self, seeds: Vec<BaseConcept>) -> Result<BuildResult> {
        tracing::info!("[GRAPH_BUILDER] Building full DSA Knowledge Graph...");
        if !self.config.enrich() {
            tracing::info!("⚡ Fast mode: keeping seed descriptions");
        }

        let mut graph = KnowledgeGraph::new();
        let mut report = BuildReport::default();

        for seed in seeds {
            tracing::debug!("[GRAPH_BUILDER] Processing: {}", seed.key);
            let (key, node, origin) = self.enrich_node(seed).await;
            report.record(origin);
            graph.insert(key, node);
        }

        tracing::info!(
            "🔧 Built {} concepts (web: {}, llm: {}, fallback: {}, seed: {})",
            report.total,
            report.count(DescriptionOrigin::Web),
            report.count(DescriptionOrigin::Llm),
            report.count(DescriptionOrigin::Fallback),
            report.count(DescriptionOrigin::Seed)
        );

        Ok(BuildResult { graph, report })
    }

    async fn load(&self, result: BuildResult) -> Result<String> {
        let graph_file = self.config.graph_file_name();
        let json = result.graph.to_json_pretty()?;

        tracing::debug!("Writing graph JSON ({} bytes) to storage", json.len());
        self.storage.write_file(graph_file, json.as_bytes()).await?;

        let formats = self.config.export_formats();
        if formats.iter().any(|f| f == "csv" || f == "tsv") {
            let manifest = ExportManifest {
                num_concepts: result.graph.len(),
                num_relations: result.graph.relation_count(),
                graph_file: graph_file.to_string(),
                built_at: Utc::now(),
            };
            let archive = export_archive(&result.graph, formats, &manifest)?;
            let archive_name = self.config.export_archive_name();
            self.storage.write_file(archive_name, &archive).await?;
            tracing::info!("📦 Export archive saved to {}", archive_name);
        }

        let output_path = Path::new(self.config.output_path())
            .join(graph_file)
            .to_string_lossy()
            .into_owned();
        tracing::info!("[GRAPH_BUILDER] ✔ Saved graph to {}", output_path);
        tracing::info!("[GRAPH_BUILDER] ✔ Total concepts: {}", result.graph.len());
        Ok(output_path)
    }
}
