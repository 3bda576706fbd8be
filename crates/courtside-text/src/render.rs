//! Plain-text renderings: a horizontal bar chart and a Graphviz DOT graph.

use std::fmt::Write;

use crate::cooccurrence::CooccurrenceGraph;

const BAR: char = '█';

/// Renders `rows` as horizontal bars, the longest `width` cells wide.
///
/// Every non-zero count gets at least one cell.
#[must_use]
pub fn render_bar_chart(rows: &[(String, u64)], width: usize) -> String {
    let Some(max) = rows.iter().map(|(_, c)| *c).max().filter(|m| *m > 0) else {
        return String::new();
    };
    let label_width = rows.iter().map(|(w, _)| w.chars().count()).max().unwrap_or(0);
    let width = u128::try_from(width.max(1)).unwrap_or(u128::MAX);
    let max = u128::from(max);

    let mut out = String::new();
    for (word, count) in rows {
        // Round half up: (count * width + max / 2) / max, never above width.
        let cells = (u128::from(*count).saturating_mul(width) + max / 2) / max;
        let cells = if *count > 0 { cells.clamp(1, width) } else { 0 };
        let bar: String = std::iter::repeat_n(BAR, usize::try_from(cells).unwrap_or(0)).collect();
        let _ = writeln!(out, "{word:<label_width$} {bar} {count}");
    }
    out
}

fn quote(label: &str) -> String {
    format!("\"{}\"", label.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Renders a co-occurrence graph as an undirected Graphviz graph. Edge
/// weights become both `weight` and `penwidth`.
#[must_use]
pub fn render_dot(graph: &CooccurrenceGraph) -> String {
    let mut out = String::from("graph cooccurrence {\n");
    out.push_str("  node [shape=ellipse, style=filled, fillcolor=lightblue];\n");
    for node in &graph.nodes {
        let _ = writeln!(out, "  {};", quote(node));
    }
    for edge in &graph.edges {
        let _ = writeln!(
            out,
            "  {} -- {} [weight={w}, penwidth={w}];",
            quote(&edge.a),
            quote(&edge.b),
            w = edge.weight
        );
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooccurrence::Edge;

    #[test]
    fn bars_scale_to_largest_count() {
        let rows = vec![("embiid".to_string(), 10), ("ft".to_string(), 5)];
        let chart = render_bar_chart(&rows, 10);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[0], format!("embiid {} 10", "█".repeat(10)));
        assert_eq!(lines[1], format!("ft     {} 5", "█".repeat(5)));
    }

    #[test]
    fn small_counts_still_get_a_bar() {
        let rows = vec![("a".to_string(), 1000), ("b".to_string(), 1)];
        let chart = render_bar_chart(&rows, 20);
        assert!(chart.lines().nth(1).unwrap().contains('█'));
    }

    #[test]
    fn largest_possible_count_fills_the_width() {
        let rows = vec![("embiid".to_string(), u64::MAX), ("ft".to_string(), u64::MAX / 2)];
        let chart = render_bar_chart(&rows, 50);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[0], format!("embiid {} {}", "█".repeat(50), u64::MAX));
        assert!(lines[1].starts_with(&format!("ft     {} ", "█".repeat(25))));
    }

    #[test]
    fn empty_or_all_zero_rows_render_nothing() {
        assert!(render_bar_chart(&[], 40).is_empty());
        assert!(render_bar_chart(&[("a".to_string(), 0)], 40).is_empty());
    }

    #[test]
    fn dot_lists_nodes_and_weighted_edges() {
        let graph = CooccurrenceGraph {
            nodes: vec!["embiid".to_string(), "foul".to_string()],
            edges: vec![Edge {
                a: "embiid".to_string(),
                b: "foul".to_string(),
                weight: 3,
            }],
        };
        let dot = render_dot(&graph);
        assert!(dot.starts_with("graph cooccurrence {\n"));
        assert!(dot.contains("  \"embiid\";\n"));
        assert!(dot.contains("  \"embiid\" -- \"foul\" [weight=3, penwidth=3];\n"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn dot_escapes_quotes() {
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
