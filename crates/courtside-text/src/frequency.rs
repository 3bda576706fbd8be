use std::collections::HashMap;

/// Word counts that remember the order in which words were first seen.
///
/// [`FrequencyTable::most_common`] breaks ties by that order, so output is
/// deterministic for a given token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every token.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for token in tokens {
            table.add(token.as_ref());
        }
        table
    }

    /// Rebuilds a table from `(word, count)` rows, summing repeated words.
    pub fn from_counts<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let mut table = Self::new();
        for (word, count) in rows {
            table.add_count(&word, count);
        }
        table
    }

    pub fn add(&mut self, word: &str) {
        self.add_count(word, 1);
    }

    /// Adds `count` occurrences of `word`. Counts saturate at `u64::MAX`.
    pub fn add_count(&mut self, word: &str, count: u64) {
        if let Some(&i) = self.index.get(word) {
            self.entries[i].1 = self.entries[i].1.saturating_add(count);
        } else {
            self.index.insert(word.to_string(), self.entries.len());
            self.entries.push((word.to_string(), count));
        }
    }

    #[must_use]
    pub fn count(&self, word: &str) -> u64 {
        self.index.get(word).map_or(0, |&i| self.entries[i].1)
    }

    /// Sum of all counts, saturating at `u64::MAX`.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |total, (_, c)| total.saturating_add(*c))
    }

    /// Number of distinct words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `n` most frequent words, highest count first; ties keep
    /// first-seen order.
    #[must_use]
    pub fn most_common(&self, n: usize) -> Vec<(String, u64)> {
        let mut sorted: Vec<&(String, u64)> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.into_iter().take(n).cloned().collect()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(w, c)| (w.as_str(), *c))
    }
}
