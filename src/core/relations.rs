//! Rule-based inference of relation tags and use cases from a concept key.

use std::collections::BTreeSet;

const DEFAULT_CATEGORY: &str = "data_structure";

/// Relation tags for a concept. Every rule whose keyword appears in the key
/// contributes its tags; the category is always included. Result is sorted
/// and de-duplicated.
pub fn generate_auto_relations(concept_key: &str, category: &str) -> Vec<String> {
    let name = concept_key.to_lowercase();
    let has = |needle: &str| name.contains(needle);
    let mut relations: BTreeSet<&str> = BTreeSet::new();

    if ["array", "matrix", "list", "vector"].iter().any(|&w| has(w)) {
        relations.extend(["linear_structure", "sequential_access"]);
    }
    if has("linked") {
        relations.extend(["pointer_based", "dynamic_structure"]);
    }
    if has("stack") {
        relations.extend(["lifo_structure", "recursion_support"]);
    }
    if has("queue") {
        relations.extend(["fifo_structure", "scheduling"]);
    }
    if has("tree") {
        relations.extend(["hierarchical_structure", "recursion"]);
    }
    if has("graph") {
        relations.extend(["network_structure", "traversal_bfs_dfs"]);
    }
    if has("sparse") {
        relations.insert("compressed_representation");
    }
    if has("search") {
        relations.insert("lookup_operation");
    }
    if has("sort") {
        relations.insert("ordering");
    }
    if has("bfs") || has("dfs") {
        relations.insert("graph_traversal");
    }
    if has("dijkstra") || has("bellman") {
        relations.insert("shortest_path");
    }

    relations.insert(if category.is_empty() {
        DEFAULT_CATEGORY
    } else {
        category
    });

    relations.into_iter().map(str::to_string).collect()
}

/// Use cases for a concept; the first matching rule wins.
pub fn generate_use_cases(concept_key: &str) -> Vec<String> {
    let n = concept_key.to_lowercase();

    let cases: &[&str] = if n.contains("stack") {
        &["function_call_stack", "undo_operations"]
    } else if n.contains("queue") {
        &["task_scheduling", "bfs_traversal"]
    } else if n.contains("tree") {
        &["hierarchical_data", "database_indexing"]
    } else if n.contains("sort") {
        &["data_ordering"]
    } else if n.contains("graph") {
        &["network_routing"]
    } else if n.contains("matrix") || n.contains("sparse") {
        &["scientific_computing"]
    } else {
        &["general_dsa_application"]
    };

    cases.iter().map(|c| c.to_string()).collect()
}

pub fn concept_id(concept_key: &str) -> String {
    format!("dsa_{}", concept_key)
}
