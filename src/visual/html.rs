use super::NeighborhoodGraph;
use crate::utils::error::Result;

const VIS_NETWORK_SCRIPT: &str =
    "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{TITLE}}</title>
<script src="{{SCRIPT}}"></script>
<style>
  body { margin: 0; background: #0e1117; color: white; font-family: sans-serif; }
  h1 { font-size: 18px; padding: 12px 16px; margin: 0; }
  #network { width: 100%; height: 600px; }
</style>
</head>
<body>
<h1>{{TITLE}}</h1>
<div id="network"></div>
<script>
  const nodes = new vis.DataSet({{NODES}});
  const edges = new vis.DataSet({{EDGES}});
  new vis.Network(
    document.getElementById("network"),
    { nodes: nodes, edges: edges },
    {
      nodes: { font: { color: "white" } },
      physics: { solver: "barnesHut" }
    }
  );
</script>
</body>
</html>
"#;

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON for an inline `<script>`; `</` would end the script element early.
fn script_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Replaces each `{{NAME}}` in one pass, so substituted text is never
/// scanned again. Unknown placeholders are left as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let value = after.find("}}").and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Standalone page drawing the view with vis-network.
pub fn render_html(view: &NeighborhoodGraph) -> Result<String> {
    let title = escape_html(&view.title);
    let nodes = script_json(&view.nodes)?;
    let edges = script_json(&view.edges)?;

    Ok(fill_template(
        PAGE_TEMPLATE,
        &[
            ("TITLE", title.as_str()),
            ("SCRIPT", VIS_NETWORK_SCRIPT),
            ("NODES", nodes.as_str()),
            ("EDGES", edges.as_str()),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::{concept, sample_graph};
    use crate::search::KnowledgeGraphSearch;
    use crate::visual::neighborhood;

    #[test]
    fn test_render_html_embeds_nodes_and_edges() {
        let search = KnowledgeGraphSearch::from_graph(sample_graph(), "kg.json");
        let html = render_html(&neighborhood(&search, "stack").unwrap()).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("vis-network"));
        assert!(html.contains("<title>Stack</title>"));
        assert!(html.contains(r#""id":"rel::lifo_structure""#));
        assert!(html.contains(r#""from":"stack""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_render_html_escapes_labels() {
        let mut graph = crate::domain::model::KnowledgeGraph::new();
        graph.insert("evil", concept("</script><b>", "data_structure", &[], ""));
        let search = KnowledgeGraphSearch::from_graph(graph, "kg.json");
        let html = render_html(&neighborhood(&search, "evil").unwrap()).unwrap();

        assert!(html.contains("<title>&lt;/script&gt;&lt;b&gt;</title>"));
        assert!(html.contains(r#""label":"<\/script><b>""#));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn test_render_html_keeps_placeholder_like_names() {
        let mut graph = crate::domain::model::KnowledgeGraph::new();
        graph.insert("odd", concept("{{EDGES}} and {{NODES}}", "data_structure", &["tag"], ""));
        let search = KnowledgeGraphSearch::from_graph(graph, "kg.json");
        let html = render_html(&neighborhood(&search, "odd").unwrap()).unwrap();

        assert!(html.contains("<title>{{EDGES}} and {{NODES}}</title>"));
        assert!(html.contains(r#""label":"{{EDGES}} and {{NODES}}""#));
        assert_eq!(html.matches(r#"const edges = new vis.DataSet([{"from":"odd","to":"rel::tag"}]);"#).count(), 1);
        assert_eq!(html.matches(r#""from":"odd""#).count(), 1);
    }

    #[test]
    fn test_fill_template_single_pass() {
        let filled = fill_template("<{{A}}|{{B}}|{{C}}|{{", &[("A", "{{B}}"), ("B", "b")]);
        assert_eq!(filled, "<{{B}}|b|{{C}}|{{");
    }
}
