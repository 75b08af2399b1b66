use super::wrap::wrap_text;
use crate::domain::model::ConceptNode;

pub const WRAP_WIDTH: usize = 90;

const DATA_STRUCTURE_TIP: &str = "💡 **Study tip:** For data structures, practice implementing the core \
operations (insert, delete, search) and analyse their time complexity.";
const ALGORITHM_TIP: &str = "💡 **Study tip:** For algorithms, make sure you understand both the \
step-by-step procedure *and* the Big-O complexity. Trace small examples by hand.";

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn code_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("`{}`", item))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Markdown card for one concept, built only from graph fields.
pub fn concept_explanation(concept: &ConceptNode) -> String {
    let mut lines = vec![
        format!("### 📘 {}", or_default(&concept.name, "Unknown")),
        String::new(),
        format!("- **Type:** `{}`", or_default(&concept.kind, "N/A")),
        format!("- **Category:** `{}`", or_default(&concept.category, "N/A")),
    ];

    if !concept.basic_ops.is_empty() {
        lines.push(format!("- **Core operations:** {}", code_list(&concept.basic_ops)));
    }
    if !concept.use_cases.is_empty() {
        lines.push(format!("- **Typical use cases:** {}", code_list(&concept.use_cases)));
    }
    if !concept.relations.is_empty() {
        lines.push(format!("- **Relations / tags:** {}", code_list(&concept.relations)));
    }

    let description = concept.description.trim();
    if !description.is_empty() {
        lines.push(String::new());
        lines.push("#### 📖 Explanation".to_string());
        lines.push(wrap_text(description, WRAP_WIDTH));
    }

    lines.join("\n")
}

pub fn study_tip(category: &str) -> Option<&'static str> {
    match category.to_lowercase().as_str() {
        "data_structure" => Some(DATA_STRUCTURE_TIP),
        "algorithm" => Some(ALGORITHM_TIP),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::concept;

    #[test]
    fn test_concept_explanation_layout() {
        let node = concept(
            "Stack",
            "data_structure",
            &["lifo_structure"],
            "  A stack follows LIFO.  ",
        );
        let markdown = concept_explanation(&node);
        let expected = "### 📘 Stack\n\
\n\
- **Type:** `linear_structure`\n\
- **Category:** `data_structure`\n\
- **Core operations:** `push`, `pop`\n\
- **Typical use cases:** `undo_operations`\n\
- **Relations / tags:** `lifo_structure`\n\
\n\
#### 📖 Explanation\n\
A stack follows LIFO.";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_concept_explanation_skips_empty_sections() {
        let node = ConceptNode {
            name: "Heap".to_string(),
            ..Default::default()
        };
        let markdown = concept_explanation(&node);
        assert_eq!(markdown, "### 📘 Heap\n\n- **Type:** `N/A`\n- **Category:** `N/A`");
    }

    #[test]
    fn test_study_tip() {
        assert!(study_tip("Data_Structure").unwrap().contains("data structures"));
        assert!(study_tip("algorithm").unwrap().contains("Big-O"));
        assert!(study_tip("graph").is_none());
    }

    #[test]
    fn test_explanation_wraps_hyphenated_description() {
        let description = format!("{} first-in first-out order.", "word ".repeat(15).trim_end());
        let node = concept("Queue", "data_structure", &[], &description);
        let markdown = concept_explanation(&node);
        let body = markdown.split("#### 📖 Explanation\n").nth(1).unwrap();
        assert_eq!(body, format!("{} first-in first-\nout order.", "word ".repeat(15).trim_end()));
    }
}
