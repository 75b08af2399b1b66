//! Lookup over a built knowledge graph: exact, fuzzy, relation and keyword
//! search, plus the combination of all four.

pub mod text;

pub use text::{close_matches, normalize_key, similarity, snippet};

use crate::domain::model::{ConceptNode, KnowledgeGraph};
use crate::utils::error::{KgError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_FUZZY_LIMIT: usize = 5;
pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.6;
pub const SNIPPET_WIDTH: usize = 60;

/// Places looked at, in order, when no graph file is given.
pub const GRAPH_FILE_CANDIDATES: [&str; 3] = [
    "data/knowledge_graph.json",
    "dsa_project/data/knowledge_graph.json",
    "../data/knowledge_graph.json",
];

const UNKNOWN: &str = "unknown";

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        UNKNOWN
    } else {
        value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub num_concepts: usize,
    pub num_relations: usize,
    pub file: String,
}

/// A graph node together with its key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConceptMatch<'a> {
    pub key: &'a str,
    #[serde(flatten)]
    pub node: &'a ConceptNode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyMatch<'a> {
    pub key: &'a str,
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub match_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedMatch<'a> {
    pub key: &'a str,
    pub name: &'a str,
    pub category: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordMatch<'a> {
    pub key: &'a str,
    pub name: &'a str,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComprehensiveResults<'a> {
    pub query: String,
    pub exact: Option<ConceptMatch<'a>>,
    pub fuzzy: Vec<FuzzyMatch<'a>>,
    pub related: Vec<RelatedMatch<'a>>,
    pub keyword: Vec<KeywordMatch<'a>>,
}

impl ComprehensiveResults<'_> {
    pub fn is_empty(&self) -> bool {
        self.exact.is_none() && self.fuzzy.is_empty() && self.related.is_empty() && self.keyword.is_empty()
    }
}

/// Explicit path wins even if it does not exist yet (opening reports that);
/// otherwise the first existing candidate.
pub fn locate_graph_file(explicit: Option<&Path>) -> Result<PathBuf> {
    locate_graph_file_in(explicit, Path::new(""))
}

/// Same as [`locate_graph_file`], with the candidates resolved against `root`.
pub fn locate_graph_file_in(explicit: Option<&Path>, root: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    GRAPH_FILE_CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|candidate| candidate.exists())
        .ok_or_else(|| KgError::GraphNotFound {
            path: root.join(GRAPH_FILE_CANDIDATES[0]).display().to_string(),
        })
}

#[derive(Debug, Clone)]
pub struct KnowledgeGraphSearch {
    graph_file: PathBuf,
    graph: KnowledgeGraph,
}

impl KnowledgeGraphSearch {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(KgError::GraphNotFound {
                path: path.display().to_string(),
            });
        }

        let content = tokio::fs::read_to_string(path).await?;
        let graph = KnowledgeGraph::from_json_str(&content)?;
        tracing::debug!("📂 Loaded {} concepts from {}", graph.len(), path.display());

        Ok(Self::from_graph(graph, path))
    }

    pub fn from_graph(graph: KnowledgeGraph, graph_file: impl Into<PathBuf>) -> Self {
        Self {
            graph_file: graph_file.into(),
            graph,
        }
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn graph_file(&self) -> &Path {
        &self.graph_file
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            num_concepts: self.graph.len(),
            num_relations: self.graph.relation_count(),
            file: self.graph_file.display().to_string(),
        }
    }

    pub fn exact_search(&self, query: &str) -> Option<ConceptMatch<'_>> {
        self.graph
            .get_entry(&normalize_key(query))
            .map(|(key, node)| ConceptMatch { key, node })
    }

    pub fn fuzzy_search(&self, query: &str) -> Vec<FuzzyMatch<'_>> {
        self.fuzzy_search_with(query, DEFAULT_FUZZY_LIMIT, DEFAULT_FUZZY_CUTOFF)
    }

    pub fn fuzzy_search_with(&self, query: &str, limit: usize, cutoff: f64) -> Vec<FuzzyMatch<'_>> {
        let norm = normalize_key(query);

        close_matches(&norm, self.graph.keys(), limit, cutoff)
            .into_iter()
            .filter_map(|(key, _)| {
                let node = self.graph.get(key)?;
                Some(FuzzyMatch {
                    key,
                    name: node.display_name(key),
                    kind: or_unknown(&node.kind),
                    match_score: similarity(&norm, key),
                })
            })
            .collect()
    }

    /// Nodes carrying the relation tag, compared case-insensitively.
    pub fn relation_search(&self, relation: &str) -> Vec<RelatedMatch<'_>> {
        let wanted = relation.to_lowercase();

        self.graph
            .iter()
            .filter(|(_, node)| node.relations.iter().any(|r| r.to_lowercase() == wanted))
            .map(|(key, node)| RelatedMatch {
                key,
                name: node.display_name(key),
                category: or_unknown(&node.category),
            })
            .collect()
    }

    pub fn keyword_search(&self, query: &str) -> Vec<KeywordMatch<'_>> {
        let wanted = query.to_lowercase();

        self.graph
            .iter()
            .filter(|(_, node)| {
                format!("{}{}", node.name, node.description)
                    .to_lowercase()
                    .contains(&wanted)
            })
            .map(|(key, node)| KeywordMatch {
                key,
                name: &node.name,
                snippet: snippet(&node.description, query, SNIPPET_WIDTH),
            })
            .collect()
    }

    pub fn comprehensive_search(&self, query: &str) -> ComprehensiveResults<'_> {
        ComprehensiveResults {
            query: query.to_string(),
            exact: self.exact_search(query),
            fuzzy: self.fuzzy_search(query),
            related: self.relation_search(query),
            keyword: self.keyword_search(query),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::model::{ConceptNode, KnowledgeGraph};

    pub fn concept(name: &str, category: &str, relations: &[&str], description: &str) -> ConceptNode {
        ConceptNode {
            name: name.to_string(),
            kind: "linear_structure".to_string(),
            category: category.to_string(),
            basic_ops: vec!["push".to_string(), "pop".to_string()],
            principle: String::new(),
            description: description.to_string(),
            relations: relations.iter().map(|r| r.to_string()).collect(),
            use_cases: vec!["undo_operations".to_string()],
            id: String::new(),
        }
    }

    pub fn sample_graph() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.insert(
            "stack",
            concept(
                "Stack",
                "data_structure",
                &["data_structure", "lifo_structure", "recursion_support"],
                "A stack is a linear data structure that follows the LIFO principle.",
            ),
        );
        graph.insert(
            "queue",
            concept(
                "Queue",
                "data_structure",
                &["data_structure", "fifo_structure", "scheduling"],
                "A queue processes elements in first in, first out order.",
            ),
        );
        graph.insert(
            "binary_search",
            concept(
                "Binary Search",
                "algorithm",
                &["algorithm", "lookup_operation"],
                "Binary search repeatedly halves a sorted array to find a target.",
            ),
        );
        graph.insert(
            "bubble_sort",
            concept("Bubble Sort", "algorithm", &["algorithm", "ordering"], ""),
        );
        graph
    }
}
