use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Seed record for one concept, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseConcept {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    #[serde(default)]
    pub basic_ops: Vec<String>,
    #[serde(default)]
    pub principle: String,
    #[serde(default)]
    pub description: String,
}

/// A node of the knowledge graph as persisted in `knowledge_graph.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConceptNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub basic_ops: Vec<String>,
    pub principle: String,
    pub description: String,
    pub relations: Vec<String>,
    pub use_cases: Vec<String>,
    pub id: String,
}

impl ConceptNode {
    /// Display name, falling back to the graph key like the search results do.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        if self.name.is_empty() {
            key
        } else {
            &self.name
        }
    }
}

impl From<BaseConcept> for ConceptNode {
    fn from(base: BaseConcept) -> Self {
        Self {
            name: base.name,
            kind: base.kind,
            category: base.category,
            basic_ops: base.basic_ops,
            principle: base.principle,
            description: base.description,
            relations: Vec::new(),
            use_cases: Vec::new(),
            id: String::new(),
        }
    }
}

/// Ordered `key -> node` map. Keeps insertion order through JSON round trips,
/// relation and keyword results are reported in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeGraph {
    order: Vec<String>,
    nodes: HashMap<String, ConceptNode>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a node. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, node: ConceptNode) {
        let key = key.into();
        if self.nodes.insert(key.clone(), node).is_none() {
            self.order.push(key);
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConceptNode> {
        self.nodes.get(key)
    }

    /// Like `get`, but also hands back the stored key.
    pub fn get_entry(&self, key: &str) -> Option<(&str, &ConceptNode)> {
        self.nodes
            .get_key_value(key)
            .map(|(key, node)| (key.as_str(), node))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConceptNode)> {
        self.order
            .iter()
            .filter_map(|key| self.nodes.get(key).map(|node| (key.as_str(), node)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of relation tags over all nodes.
    pub fn relation_count(&self) -> usize {
        self.nodes.values().map(|node| node.relations.len()).sum()
    }

    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for KnowledgeGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, node) in self.iter() {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

struct KnowledgeGraphVisitor;

impl<'de> Visitor<'de> for KnowledgeGraphVisitor {
    type Value = KnowledgeGraph;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object mapping concept keys to concept nodes")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut graph = KnowledgeGraph::new();
        while let Some((key, node)) = access.next_entry::<String, ConceptNode>()? {
            graph.insert(key, node);
        }
        Ok(graph)
    }
}

impl<'de> Deserialize<'de> for KnowledgeGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(KnowledgeGraphVisitor)
    }
}

/// Where a concept description came from during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionOrigin {
    Seed,
    Web,
    Llm,
    Fallback,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub total: usize,
    pub origins: HashMap<DescriptionOrigin, usize>,
}

impl BuildReport {
    pub fn record(&mut self, origin: DescriptionOrigin) {
        self.total += 1;
        *self.origins.entry(origin).or_insert(0) += 1;
    }

    pub fn count(&self, origin: DescriptionOrigin) -> usize {
        self.origins.get(&origin).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct BuildResult {
    pub graph: KnowledgeGraph,
    pub report: BuildReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, relations: &[&str]) -> ConceptNode {
        ConceptNode {
            name: name.to_string(),
            relations: relations.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_graph_keeps_insertion_order_through_json() {
        let mut graph = KnowledgeGraph::new();
        graph.insert("stack", node("Stack", &["lifo_structure"]));
        graph.insert("array", node("Array", &["linear_structure", "data_structure"]));
        graph.insert("queue", node("Queue", &[]));

        let json = graph.to_json_pretty().unwrap();
        let parsed = KnowledgeGraph::from_json_str(&json).unwrap();

        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["stack", "array", "queue"]);
        assert_eq!(parsed.relation_count(), 3);
        assert_eq!(parsed, graph);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let parsed = KnowledgeGraph::from_json_str(r#"{"tree": {"name": "Tree"}}"#).unwrap();
        let tree = parsed.get("tree").unwrap();
        assert_eq!(tree.name, "Tree");
        assert!(tree.relations.is_empty());
        assert!(tree.id.is_empty());
    }

    #[test]
    fn test_replacing_a_node_keeps_its_position() {
        let mut graph = KnowledgeGraph::new();
        graph.insert("a", node("A", &[]));
        graph.insert("b", node("B", &[]));
        graph.insert("a", node("A2", &[]));

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(graph.get("a").unwrap().name, "A2");
    }

    #[test]
    fn test_node_json_uses_type_field_name() {
        let node = ConceptNode {
            name: "Stack".to_string(),
            kind: "linear_structure".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "linear_structure");
        assert_eq!(node.display_name("stack"), "Stack");
        assert_eq!(ConceptNode::default().display_name("stack"), "stack");
    }
}
