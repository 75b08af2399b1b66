//! Deterministic question answering on top of the search engine. Everything
//! comes from the local graph, no model is called here.

mod markdown;
mod wrap;

pub use markdown::{concept_explanation, study_tip};
pub use wrap::wrap_text;

use crate::domain::model::ConceptNode;
use crate::search::{ComprehensiveResults, KnowledgeGraphSearch};
use crate::utils::error::Result;
use serde::Serialize;
use std::path::Path;

pub const EMPTY_CONCEPT_MESSAGE: &str = "Please provide a non-empty concept name.";
pub const EMPTY_QUESTION_MESSAGE: &str = "Please type a question or a concept name.";
pub const UNMAPPED_QUESTION_MESSAGE: &str = "I couldn't map your question to a specific concept in the knowledge graph.\n\n\
Try asking something like:\n\
- `Explain stack`\n\
- `What is binary search?`\n\
- `Define adjacency list`\n";

/// Question prefixes that name a concept directly, matched case-insensitively.
pub const QUESTION_PREFIXES: [&str; 3] = ["explain ", "what is ", "define "];

/// Strips a leading question prefix, returning the concept part.
pub fn strip_question_prefix(question: &str) -> Option<&str> {
    let lowered = question.to_lowercase();
    QUESTION_PREFIXES
        .iter()
        .find(|prefix| lowered.starts_with(*prefix))
        .and_then(|prefix| question.get(prefix.len()..))
        .map(str::trim)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Exact,
    Fuzzy,
    Keyword,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TutorAnswer {
    pub query: String,
    pub matched_key: Option<String>,
    pub match_source: MatchSource,
    pub concept: Option<ConceptNode>,
    pub answer_markdown: String,
}

impl TutorAnswer {
    fn unmatched(query: &str, message: impl Into<String>) -> Self {
        Self {
            query: query.to_string(),
            matched_key: None,
            match_source: MatchSource::None,
            concept: None,
            answer_markdown: message.into(),
        }
    }
}

struct Pick<'a> {
    key: &'a str,
    node: &'a ConceptNode,
    source: MatchSource,
}

/// Exact hit first, then the best fuzzy score (earliest on ties), then the
/// first keyword hit.
fn pick_best<'a>(search: &'a KnowledgeGraphSearch, results: &ComprehensiveResults<'a>) -> Option<Pick<'a>> {
    if let Some(exact) = results.exact {
        return Some(Pick {
            key: exact.key,
            node: exact.node,
            source: MatchSource::Exact,
        });
    }

    let best_fuzzy = results
        .fuzzy
        .iter()
        .reduce(|best, candidate| if candidate.match_score > best.match_score { candidate } else { best });

    let (key, source) = match best_fuzzy {
        Some(hit) => (hit.key, MatchSource::Fuzzy),
        None => (results.keyword.first()?.key, MatchSource::Keyword),
    };

    search.graph().get(key).map(|node| Pick { key, node, source })
}

#[derive(Debug, Clone)]
pub struct DsaTutorEngine {
    search: KnowledgeGraphSearch,
}

impl DsaTutorEngine {
    pub async fn open(graph_file: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(KnowledgeGraphSearch::open(graph_file).await?))
    }

    pub fn new(search: KnowledgeGraphSearch) -> Self {
        Self { search }
    }

    pub fn search(&self) -> &KnowledgeGraphSearch {
        &self.search
    }

    pub fn explain_concept(&self, concept_name: &str) -> TutorAnswer {
        let query = concept_name.trim();
        if query.is_empty() {
            return TutorAnswer::unmatched(concept_name, EMPTY_CONCEPT_MESSAGE);
        }

        let results = self.search.comprehensive_search(query);
        match pick_best(&self.search, &results) {
            Some(pick) => self.explain_pick(query, pick),
            None => TutorAnswer::unmatched(
                query,
                format!("I couldn't find a clear match for **{}** in the knowledge graph.", query),
            ),
        }
    }

    pub fn answer(&self, question: &str) -> TutorAnswer {
        let query = question.trim();
        if query.is_empty() {
            return TutorAnswer::unmatched(question, EMPTY_QUESTION_MESSAGE);
        }

        if let Some(concept) = strip_question_prefix(query) {
            tracing::debug!("🎓 Question names concept '{}'", concept);
            return self.explain_concept(concept);
        }

        let results = self.search.comprehensive_search(query);
        match pick_best(&self.search, &results) {
            Some(pick) => self.explain_pick(query, pick),
            None => TutorAnswer::unmatched(query, UNMAPPED_QUESTION_MESSAGE),
        }
    }

    fn explain_pick(&self, query: &str, pick: Pick<'_>) -> TutorAnswer {
        let mut answer_markdown = concept_explanation(pick.node);
        if let Some(tip) = study_tip(&pick.node.category) {
            answer_markdown.push_str("\n\n");
            answer_markdown.push_str(tip);
        }

        TutorAnswer {
            query: query.to_string(),
            matched_key: Some(pick.key.to_string()),
            match_source: pick.source,
            concept: Some(pick.node.clone()),
            answer_markdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::sample_graph;

    fn tutor() -> DsaTutorEngine {
        DsaTutorEngine::new(KnowledgeGraphSearch::from_graph(sample_graph(), "kg.json"))
    }

    #[test]
    fn test_strip_question_prefix() {
        assert_eq!(strip_question_prefix("Explain stack"), Some("stack"));
        assert_eq!(strip_question_prefix("WHAT IS  binary search?"), Some("binary search?"));
        assert_eq!(strip_question_prefix("define queue"), Some("queue"));
        assert_eq!(strip_question_prefix("explainstack"), None);
        assert_eq!(strip_question_prefix("how do trees work"), None);
    }

    #[test]
    fn test_explain_concept_exact() {
        let answer = tutor().explain_concept("Stack");
        assert_eq!(answer.match_source, MatchSource::Exact);
        assert_eq!(answer.matched_key.as_deref(), Some("stack"));
        assert!(answer.answer_markdown.starts_with("### 📘 Stack"));
        assert!(answer.answer_markdown.contains("💡 **Study tip:** For data structures"));
    }

    #[test]
    fn test_explain_concept_fuzzy_and_keyword() {
        let tutor = tutor();

        let answer = tutor.explain_concept("stak");
        assert_eq!(answer.match_source, MatchSource::Fuzzy);
        assert_eq!(answer.matched_key.as_deref(), Some("stack"));

        let answer = tutor.explain_concept("LIFO");
        assert_eq!(answer.match_source, MatchSource::Keyword);
        assert_eq!(answer.matched_key.as_deref(), Some("stack"));
    }

    #[test]
    fn test_explain_concept_empty_and_unknown() {
        let tutor = tutor();

        let answer = tutor.explain_concept("   ");
        assert_eq!(answer.answer_markdown, EMPTY_CONCEPT_MESSAGE);
        assert_eq!(answer.match_source, MatchSource::None);
        assert_eq!(answer.query, "   ");

        let answer = tutor.explain_concept("qwxz");
        assert_eq!(
            answer.answer_markdown,
            "I couldn't find a clear match for **qwxz** in the knowledge graph."
        );
        assert!(answer.concept.is_none());
    }

    #[test]
    fn test_answer_routes_prefixed_questions() {
        let answer = tutor().answer("  What is binary search");
        assert_eq!(answer.query, "binary search");
        assert_eq!(answer.match_source, MatchSource::Exact);
        assert!(answer.answer_markdown.contains("💡 **Study tip:** For algorithms"));
    }

    #[test]
    fn test_answer_generic_question() {
        let tutor = tutor();

        let answer = tutor.answer("sorted array");
        assert_eq!(answer.query, "sorted array");
        assert_eq!(answer.matched_key.as_deref(), Some("binary_search"));
        assert_eq!(answer.match_source, MatchSource::Keyword);

        let answer = tutor.answer("qwxz qwxz");
        assert_eq!(answer.answer_markdown, UNMAPPED_QUESTION_MESSAGE);

        let answer = tutor.answer("");
        assert_eq!(answer.answer_markdown, EMPTY_QUESTION_MESSAGE);
    }

    #[test]
    fn test_answer_serializes_snake_case_source() {
        let answer = tutor().answer("explain queue");
        let value = serde_json::to_value(&answer).unwrap();
        assert_eq!(value["match_source"], "exact");
        assert_eq!(value["matched_key"], "queue");
        assert_eq!(value["concept"]["name"], "Queue");
    }
}
