use crate::core::KnowledgeGraph;
use crate::utils::error::{KgError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const EXPORT_FORMATS: [&str; 3] = ["json", "csv", "tsv"];

const HEADER: [&str; 7] = ["key", "id", "name", "type", "category", "relations", "use_cases"];

#[derive(Debug, Serialize)]
pub struct ExportManifest {
    pub num_concepts: usize,
    pub num_relations: usize,
    pub graph_file: String,
    pub built_at: DateTime<Utc>,
}

/// 以指定分隔符輸出概念表（列表欄位以 `;` 連接）
pub fn concepts_table(graph: &KnowledgeGraph, delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for (key, node) in graph.iter() {
        writer.write_record([
            key,
            node.id.as_str(),
            node.name.as_str(),
            node.kind.as_str(),
            node.category.as_str(),
            node.relations.join(";").as_str(),
            node.use_cases.join(";").as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| KgError::ProcessingError {
        message: format!("failed to flush table writer: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| KgError::ProcessingError {
        message: format!("table output is not UTF-8: {}", e),
    })
}

/// Bundles the requested tables plus a manifest into one ZIP archive.
pub fn export_archive(
    graph: &KnowledgeGraph,
    formats: &[String],
    manifest: &ExportManifest,
) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    if formats.iter().any(|f| f == "csv") {
        zip.start_file::<_, ()>("concepts.csv", FileOptions::default())?;
        zip.write_all(concepts_table(graph, b',')?.as_bytes())?;
    }

    if formats.iter().any(|f| f == "tsv") {
        zip.start_file::<_, ()>("concepts.tsv", FileOptions::default())?;
        zip.write_all(concepts_table(graph, b'\t')?.as_bytes())?;
    }

    zip.start_file::<_, ()>("manifest.json", FileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(manifest)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConceptNode;
    use std::io::Read;

    fn sample_graph() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.insert(
            "stack",
            ConceptNode {
                name: "Stack".to_string(),
                kind: "linear_structure".to_string(),
                category: "data_structure".to_string(),
                relations: vec!["data_structure".to_string(), "lifo_structure".to_string()],
                use_cases: vec!["undo_operations".to_string()],
                id: "dsa_stack".to_string(),
                ..Default::default()
            },
        );
        graph
    }

    fn manifest() -> ExportManifest {
        ExportManifest {
            num_concepts: 1,
            num_relations: 2,
            graph_file: "data/knowledge_graph.json".to_string(),
            built_at: Utc::now(),
        }
    }

    #[test]
    fn test_concepts_table_csv_and_tsv() {
        let graph = sample_graph();

        let csv = concepts_table(&graph, b',').unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "key,id,name,type,category,relations,use_cases");
        assert_eq!(
            lines[1],
            "stack,dsa_stack,Stack,linear_structure,data_structure,data_structure;lifo_structure,undo_operations"
        );

        let tsv = concepts_table(&graph, b'\t').unwrap();
        assert!(tsv.starts_with("key\tid\tname"));
    }

    #[test]
    fn test_export_archive_contents_follow_formats() {
        let graph = sample_graph();
        let bytes = export_archive(&graph, &["tsv".to_string()], &manifest()).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();

        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["concepts.tsv", "manifest.json"]);

        let mut content = String::new();
        archive
            .by_name("manifest.json")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        let manifest: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(manifest["num_concepts"], 1);
        assert_eq!(manifest["num_relations"], 2);
    }
}
