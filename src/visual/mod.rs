//! Graph views for rendering: the neighborhood around one concept and the
//! category overview. Emitted as `nodes`/`edges` JSON or a standalone
//! vis-network page.

mod html;

pub use html::render_html;

use crate::domain::model::KnowledgeGraph;
use crate::search::KnowledgeGraphSearch;
use crate::utils::error::{KgError, Result};
use serde::Serialize;
use std::collections::HashSet;

pub const MAX_NEIGHBORS: usize = 6;

pub const CENTER_COLOR: &str = "#ffb000";
pub const RELATION_COLOR: &str = "#00b5ff";
pub const NEIGHBOR_COLOR: &str = "#7cff7c";

pub const HUB_COLOR: &str = "#2CA6A4";
pub const DATA_STRUCTURE_COLOR: &str = "#1E3A8A";
pub const ALGORITHM_COLOR: &str = "#EA580C";
pub const GRAPH_ALGORITHM_COLOR: &str = "#7C3AED";
pub const OTHER_COLOR: &str = "#6B7280";

const CENTER_SIZE: u32 = 28;
const NEIGHBOR_SIZE: u32 = 18;
const HUB_ID: &str = "hub::dsa";
const GRAPH_ALGORITHM_GROUP: &str = "graph_algorithm";
const GRAPH_ALGORITHM_TAGS: [&str; 3] = ["graph_traversal", "shortest_path", "traversal_bfs_dfs"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NeighborhoodGraph {
    pub title: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl NeighborhoodGraph {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Adds a node unless its id is already present.
    fn add_node(&mut self, node: GraphNode) {
        if self.seen.insert(node.id.clone()) {
            self.nodes.push(node);
        }
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        self.edges.push(GraphEdge {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_html(&self) -> Result<String> {
        render_html(self)
    }
}

fn node(id: &str, label: &str, color: &str) -> GraphNode {
    GraphNode {
        id: id.to_string(),
        label: label.to_string(),
        color: color.to_string(),
        shape: None,
        size: None,
    }
}

/// Concept at the center, one box per relation tag, and up to
/// `MAX_NEIGHBORS` other concepts per tag.
pub fn neighborhood(search: &KnowledgeGraphSearch, concept_key: &str) -> Result<NeighborhoodGraph> {
    let concept = search
        .graph()
        .get(concept_key)
        .ok_or_else(|| KgError::ConceptNotFound {
            key: concept_key.to_string(),
        })?;

    let center_label = concept.display_name(concept_key);
    let mut view = NeighborhoodGraph::new(center_label);
    view.add_node(GraphNode {
        size: Some(CENTER_SIZE),
        ..node(concept_key, center_label, CENTER_COLOR)
    });

    for relation in &concept.relations {
        let relation_id = format!("rel::{}", relation);
        view.add_node(GraphNode {
            shape: Some("box".to_string()),
            ..node(&relation_id, relation, RELATION_COLOR)
        });
        view.add_edge(concept_key, &relation_id);

        let neighbors = search
            .relation_search(relation)
            .into_iter()
            .filter(|hit| hit.key != concept_key)
            .take(MAX_NEIGHBORS);

        for hit in neighbors {
            view.add_node(GraphNode {
                size: Some(NEIGHBOR_SIZE),
                ..node(hit.key, hit.name, NEIGHBOR_COLOR)
            });
            view.add_edge(&relation_id, hit.key);
        }
    }

    tracing::debug!(
        "🕸️ Neighborhood of '{}': {} nodes, {} edges",
        concept_key,
        view.nodes.len(),
        view.edges.len()
    );
    Ok(view)
}

/// Display group of a concept; graph traversal and shortest path
/// algorithms get their own group.
pub fn overview_group<'a>(category: &'a str, relations: &[String]) -> &'a str {
    if category == "algorithm"
        && relations
            .iter()
            .any(|r| GRAPH_ALGORITHM_TAGS.contains(&r.as_str()))
    {
        GRAPH_ALGORITHM_GROUP
    } else {
        category
    }
}

fn group_color(group: &str) -> &'static str {
    match group {
        "data_structure" => DATA_STRUCTURE_COLOR,
        "algorithm" => ALGORITHM_COLOR,
        GRAPH_ALGORITHM_GROUP => GRAPH_ALGORITHM_COLOR,
        _ => OTHER_COLOR,
    }
}

/// Hub node, one node per group, every concept linked to its group.
pub fn overview(graph: &KnowledgeGraph) -> NeighborhoodGraph {
    let mut view = NeighborhoodGraph::new("DSA Knowledge Graph");
    view.add_node(GraphNode {
        size: Some(CENTER_SIZE),
        ..node(HUB_ID, "DSA Knowledge Graph", HUB_COLOR)
    });

    for (key, concept) in graph.iter() {
        let category = if concept.category.is_empty() {
            "uncategorized"
        } else {
            concept.category.as_str()
        };
        let group = overview_group(category, &concept.relations);
        let color = group_color(group);
        let group_id = format!("group::{}", group);

        if !view.seen.contains(&group_id) {
            view.add_node(GraphNode {
                shape: Some("box".to_string()),
                ..node(&group_id, group, color)
            });
            view.add_edge(HUB_ID, &group_id);
        }

        view.add_node(GraphNode {
            size: Some(NEIGHBOR_SIZE),
            ..node(key, concept.display_name(key), color)
        });
        view.add_edge(&group_id, key);
    }

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::{concept, sample_graph};

    fn search() -> KnowledgeGraphSearch {
        KnowledgeGraphSearch::from_graph(sample_graph(), "kg.json")
    }

    #[test]
    fn test_neighborhood_structure() {
        let view = neighborhood(&search(), "stack").unwrap();

        let center = view.node("stack").unwrap();
        assert_eq!(center.color, CENTER_COLOR);
        assert_eq!(center.size, Some(28));

        let tag = view.node("rel::data_structure").unwrap();
        assert_eq!(tag.shape.as_deref(), Some("box"));
        assert_eq!(tag.color, RELATION_COLOR);

        let neighbor = view.node("queue").unwrap();
        assert_eq!(neighbor.color, NEIGHBOR_COLOR);
        assert_eq!(neighbor.label, "Queue");

        // center + 3 tags + queue
        assert_eq!(view.nodes.len(), 5);
        assert!(view.edges.contains(&GraphEdge {
            from: "rel::data_structure".to_string(),
            to: "queue".to_string(),
        }));
        assert!(view.edges.iter().all(|e| e.to != "stack"));
    }

    #[test]
    fn test_neighborhood_limits_neighbors_per_tag() {
        let mut graph = KnowledgeGraph::new();
        for i in 0..10 {
            graph.insert(format!("c{}", i), concept(&format!("C{}", i), "data_structure", &["shared"], ""));
        }
        let search = KnowledgeGraphSearch::from_graph(graph, "kg.json");

        let view = neighborhood(&search, "c0").unwrap();
        assert_eq!(view.nodes.len(), 1 + 1 + MAX_NEIGHBORS);
        assert!(view.node("c1").is_some());
        assert!(view.node("c7").is_none());
    }

    #[test]
    fn test_neighborhood_unknown_concept() {
        let result = neighborhood(&search(), "heap");
        assert!(matches!(result, Err(KgError::ConceptNotFound { key }) if key == "heap"));
    }

    #[test]
    fn test_overview_groups() {
        let mut graph = sample_graph();
        graph.insert("bfs", concept("BFS", "algorithm", &["algorithm", "graph_traversal"], ""));
        let view = overview(&graph);

        assert!(view.node(HUB_ID).is_some());
        assert_eq!(view.node("group::data_structure").unwrap().color, DATA_STRUCTURE_COLOR);
        assert_eq!(view.node("group::algorithm").unwrap().color, ALGORITHM_COLOR);
        assert_eq!(view.node("bfs").unwrap().color, GRAPH_ALGORITHM_COLOR);
        // hub + 3 groups + 5 concepts
        assert_eq!(view.nodes.len(), 9);
        assert_eq!(view.edges.len(), 3 + 5);
    }

    #[test]
    fn test_to_json_shape() {
        let view = neighborhood(&search(), "bubble_sort").unwrap();
        let value: serde_json::Value = serde_json::from_str(&view.to_json().unwrap()).unwrap();
        assert_eq!(value["nodes"][0]["id"], "bubble_sort");
        assert!(value["nodes"][0].get("shape").is_none());
        assert!(value.get("seen").is_none());
        assert!(value["edges"].as_array().unwrap().len() >= 2);
    }
}
