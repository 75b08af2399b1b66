//! Interactive prompt over the knowledge graph.

use crate::search::{
    ComprehensiveResults, ConceptMatch, FuzzyMatch, GraphStats, KeywordMatch, RelatedMatch,
};
use crate::tutor::{strip_question_prefix, DsaTutorEngine};
use crate::utils::error::Result;
use std::io::{BufRead, Write};

pub const PROMPT: &str = "🔍 Enter a query: ";
const RULE_WIDTH: usize = 60;
const CARD_DESCRIPTION_CHARS: usize = 400;
const MAX_READ_FAILURES: usize = 3;

pub fn print_header<W: Write>(out: &mut W, title: &str) -> Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{}\n{}\n{}", rule, title, rule)?;
    Ok(())
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

fn print_list<W: Write>(out: &mut W, title: &str, items: &[String]) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n{}", title)?;
    for item in items {
        writeln!(out, "  - {}", item)?;
    }
    Ok(())
}

pub fn print_concept<W: Write>(out: &mut W, concept: &ConceptMatch<'_>) -> Result<()> {
    let node = concept.node;
    let name = if node.name.is_empty() { "Unknown" } else { node.name.as_str() };
    print_header(out, &format!("📘 CONCEPT: {}", name.to_uppercase()))?;

    writeln!(out, "ID:            {}", or_na(&node.id))?;
    writeln!(out, "Type:          {}", or_na(&node.kind))?;
    writeln!(out, "Category:      {}", or_na(&node.category))?;

    print_list(out, "⚙️  Basic Operations:", &node.basic_ops)?;
    print_list(out, "📌 Use Cases:", &node.use_cases)?;
    print_list(out, "🔗 Relations:", &node.relations)?;

    if !node.description.is_empty() {
        let head: String = node.description.chars().take(CARD_DESCRIPTION_CHARS).collect();
        let more = node.description.chars().count() > CARD_DESCRIPTION_CHARS;
        writeln!(out, "\n📖 Description:")?;
        writeln!(out, "  {}{}", head, if more { "..." } else { "" })?;
    }
    Ok(())
}

pub fn print_fuzzy_results<W: Write>(out: &mut W, results: &[FuzzyMatch<'_>]) -> Result<()> {
    if results.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n🤔 Possible matches:")?;
    for hit in results {
        writeln!(out, "  - {} (score={:.2})", hit.name, hit.match_score)?;
    }
    Ok(())
}

pub fn print_related_results<W: Write>(out: &mut W, results: &[RelatedMatch<'_>]) -> Result<()> {
    if results.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n🔗 Related Concepts:")?;
    for hit in results {
        writeln!(out, "  - {} (category '{}')", hit.name, hit.category)?;
    }
    Ok(())
}

pub fn print_keyword_results<W: Write>(out: &mut W, results: &[KeywordMatch<'_>]) -> Result<()> {
    if results.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n🔍 Keyword Matches:")?;
    for hit in results {
        writeln!(out, "  - {}: {}", hit.name, hit.snippet)?;
    }
    Ok(())
}

pub fn print_stats<W: Write>(out: &mut W, stats: &GraphStats) -> Result<()> {
    print_header(out, "📊 GRAPH STATISTICS")?;
    writeln!(out, "Concepts:       {}", stats.num_concepts)?;
    writeln!(out, "Relations:      {}", stats.num_relations)?;
    writeln!(out, "Source File:    {}", stats.file)?;
    Ok(())
}

pub fn print_results<W: Write>(out: &mut W, results: &ComprehensiveResults<'_>) -> Result<()> {
    match &results.exact {
        Some(concept) => print_concept(out, concept)?,
        None => writeln!(out, "\n❌ No exact match found.")?,
    }
    print_fuzzy_results(out, &results.fuzzy)?;
    print_related_results(out, &results.related)?;
    print_keyword_results(out, &results.keyword)?;
    Ok(())
}

pub fn show_help<W: Write>(out: &mut W) -> Result<()> {
    print_header(out, "HELP - AVAILABLE COMMANDS")?;
    writeln!(
        out,
        "
Type any concept name to search, e.g.:
    stack
    binary search
    adjacency list
    recursion

Ask the tutor with a question prefix:
    explain stack
    what is binary search
    define adjacency list

Special commands:
    help    -> Show this help
    stats   -> Display graph statistics
    quit    -> Exit the program
"
    )?;
    Ok(())
}

/// Runs until `quit` or end of input. A read failure is reported and the
/// loop keeps going, unless it fails `MAX_READ_FAILURES` times in a row;
/// write failures end it.
pub fn run<R: BufRead, W: Write>(tutor: &DsaTutorEngine, mut input: R, mut out: W) -> Result<()> {
    print_header(&mut out, "🎓 DSA Knowledge Graph - CLI Interface")?;
    writeln!(out, "Type 'help' to see available commands.\n")?;

    let mut line = String::new();
    let mut read_failures = 0;
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => {
                writeln!(out, "\n👋 Goodbye!")?;
                break;
            }
            Ok(_) => read_failures = 0,
            Err(e) => {
                read_failures += 1;
                tracing::warn!("⚠️ Failed to read input ({}/{}): {}", read_failures, MAX_READ_FAILURES, e);
                writeln!(out, "\n❌ Error: {}", e)?;
                if read_failures >= MAX_READ_FAILURES {
                    return Err(e.into());
                }
                continue;
            }
        }

        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        match query.to_lowercase().as_str() {
            "quit" => {
                writeln!(out, "\n👋 Goodbye!")?;
                break;
            }
            "help" => show_help(&mut out)?,
            "stats" => print_stats(&mut out, &tutor.search().stats())?,
            _ if strip_question_prefix(query).is_some() => {
                let answer = tutor.answer(query);
                writeln!(out, "\n{}\n", answer.answer_markdown)?;
            }
            _ => print_results(&mut out, &tutor.search().comprehensive_search(query))?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::sample_graph;
    use crate::search::KnowledgeGraphSearch;
    use crate::utils::error::KgError;

    fn session(input: &str) -> String {
        let tutor = DsaTutorEngine::new(KnowledgeGraphSearch::from_graph(sample_graph(), "kg.json"));
        let mut out = Vec::new();
        run(&tutor, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_quit_and_blank_lines() {
        let output = session("\n   \nquit\nstack\n");
        assert!(output.contains("👋 Goodbye!"));
        assert!(!output.contains("CONCEPT: STACK"));
        assert_eq!(output.matches(PROMPT).count(), 3);
    }

    #[test]
    fn test_search_prints_sections() {
        let output = session("stack\n");
        assert!(output.contains("📘 CONCEPT: STACK"));
        assert!(output.contains("⚙️  Basic Operations:\n  - push\n  - pop"));
        assert!(output.contains("🤔 Possible matches:\n  - Stack (score=1.00)"));
        assert!(output.contains("🔍 Keyword Matches:\n  - Stack: "));
        // 輸入結束也會道別
        assert!(output.ends_with("👋 Goodbye!\n"));
    }

    #[test]
    fn test_relation_query_lists_related() {
        let output = session("lifo_structure\n");
        assert!(output.contains("❌ No exact match found."));
        assert!(output.contains("🔗 Related Concepts:\n  - Stack (category 'data_structure')"));
    }

    #[test]
    fn test_stats_help_and_tutor() {
        let output = session("STATS\nhelp\nexplain queue\n");
        assert!(output.contains("Concepts:       4"));
        assert!(output.contains("Source File:    kg.json"));
        assert!(output.contains("HELP - AVAILABLE COMMANDS"));
        assert!(output.contains("### 📘 Queue"));
    }

    #[test]
    fn test_invalid_input_is_reported_and_loop_continues() {
        let tutor = DsaTutorEngine::new(KnowledgeGraphSearch::from_graph(sample_graph(), "kg.json"));
        let mut out = Vec::new();
        run(&tutor, &b"\xff\xfe\nquit\n"[..], &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("❌ Error:"));
        assert!(output.ends_with("👋 Goodbye!\n"));
        assert_eq!(output.matches(PROMPT).count(), 2);
    }

    /// Reader whose every read fails.
    struct BrokenInput;

    impl std::io::Read for BrokenInput {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("is a directory"))
        }
    }

    #[test]
    fn test_repeated_read_failures_end_the_loop() {
        let tutor = DsaTutorEngine::new(KnowledgeGraphSearch::from_graph(sample_graph(), "kg.json"));
        let mut out = Vec::new();
        let result = run(&tutor, std::io::BufReader::new(BrokenInput), &mut out);

        assert!(matches!(result, Err(KgError::IoError(_))));
        let output = String::from_utf8(out).unwrap();
        assert_eq!(output.matches("❌ Error: is a directory").count(), MAX_READ_FAILURES);
        assert!(!output.contains("Goodbye"));
    }
}
