use courtside_text::{content_tokens, cooccurrence, CooccurrenceGraph, FrequencyTable, StopWords};

/// Content tokens of a text corpus and their counts.
#[derive(Debug)]
pub(crate) struct WordAnalysis {
    pub tokens: Vec<String>,
    pub table: FrequencyTable,
    pub top: Vec<(String, u64)>,
}

impl WordAnalysis {
    /// Adjacent-pair network over the top words.
    pub fn network(&self, min_count: u64) -> CooccurrenceGraph {
        let top_words: Vec<String> = self.top.iter().map(|(w, _)| w.clone()).collect();
        cooccurrence(&self.tokens, &top_words, min_count)
    }
}

pub(crate) fn analyze<'a, I>(texts: I, stopwords: &StopWords, top_n: usize) -> WordAnalysis
where
    I: IntoIterator<Item = &'a str>,
{
    let tokens = content_tokens(texts, stopwords);
    let table = FrequencyTable::from_tokens(&tokens);
    let top = table.most_common(top_n);
    tracing::debug!(
        tokens = tokens.len(),
        distinct = table.len(),
        "counted content words"
    );
    WordAnalysis { tokens, table, top }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_text::DEFAULT_MIN_COUNT;

    #[test]
    fn counts_content_words_across_texts() {
        let texts = [
            "Embiid fouled out again",
            "The refs called Embiid for a foul",
            "Embiid foul trouble",
        ];
        let analysis = analyze(texts, &StopWords::english(), 2);
        assert_eq!(analysis.top[0], ("embiid".to_string(), 3));
        assert_eq!(analysis.top[1], ("foul".to_string(), 2));
        assert!(!analysis.tokens.iter().any(|t| t == "the"));
        assert_eq!(analysis.table.count("refs"), 1);
    }

    #[test]
    fn network_only_links_top_words() {
        let texts = ["embiid foul embiid foul", "maxey shot"];
        let analysis = analyze(texts, &StopWords::english(), 2);
        let graph = analysis.network(DEFAULT_MIN_COUNT);
        assert_eq!(graph.nodes, vec!["embiid".to_string(), "foul".to_string()]);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].weight, 3);
    }

    #[test]
    fn empty_corpus_has_no_top_words() {
        let analysis = analyze(std::iter::empty(), &StopWords::with_sports_extras(), 20);
        assert!(analysis.top.is_empty());
        assert!(analysis.network(DEFAULT_MIN_COUNT).edges.is_empty());
    }
}
