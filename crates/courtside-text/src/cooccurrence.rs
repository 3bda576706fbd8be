//! Adjacent-word co-occurrence networks.

use std::collections::{HashMap, HashSet};

/// Edges must occur more often than this to be kept.
pub const DEFAULT_MIN_COUNT: u64 = 1;

/// An undirected, weighted edge. `a`/`b` keep the orientation of the first
/// occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub a: String,
    pub b: String,
    pub weight: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CooccurrenceGraph {
    /// Words that appear in at least one edge, in `top_words` order.
    pub nodes: Vec<String>,
    /// Edges in order of first occurrence.
    pub edges: Vec<Edge>,
}

/// Counts adjacent token pairs where both tokens are in `top_words`.
///
/// `(a, b)` and `(b, a)` are the same edge and their counts are summed. Only
/// edges whose count exceeds `min_count` are kept.
#[must_use]
pub fn cooccurrence<S: AsRef<str>>(
    tokens: &[S],
    top_words: &[String],
    min_count: u64,
) -> CooccurrenceGraph {
    let top: HashSet<&str> = top_words.iter().map(String::as_str).collect();
    let mut edges: Vec<Edge> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for pair in tokens.windows(2) {
        let (first, second) = (pair[0].as_ref(), pair[1].as_ref());
        if !top.contains(first) || !top.contains(second) {
            continue;
        }
        let key = if first <= second {
            (first.to_string(), second.to_string())
        } else {
            (second.to_string(), first.to_string())
        };
        match index.get(&key) {
            Some(&i) => edges[i].weight += 1,
            None => {
                index.insert(key, edges.len());
                edges.push(Edge {
                    a: first.to_string(),
                    b: second.to_string(),
                    weight: 1,
                });
            }
        }
    }

    edges.retain(|edge| edge.weight > min_count);
    let connected: HashSet<&str> = edges
        .iter()
        .flat_map(|e| [e.a.as_str(), e.b.as_str()])
        .collect();
    let nodes = top_words
        .iter()
        .filter(|w| connected.contains(w.as_str()))
        .cloned()
        .collect();

    CooccurrenceGraph { nodes, edges }
}
