//! Query building and title matching for submission search.

/// Builds the provider query `title:A OR title:B ...` for the given keywords.
///
/// Multi-word keywords are quoted so the provider treats them as a phrase.
pub(crate) fn build_title_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(|k| {
            if k.contains(char::is_whitespace) {
                format!("title:\"{k}\"")
            } else {
                format!("title:{k}")
            }
        })
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Normalizes keywords into the form [`mentions_any`] compares against.
pub(crate) fn build_match_terms(keywords: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = keywords
        .iter()
        .map(|k| normalize_text_for_match(k))
        .filter(|t| !t.is_empty())
        .collect();
    terms.sort();
    terms.dedup();
    terms
}

/// True when `text` contains any of `terms` as a whole word or phrase,
/// ignoring case and punctuation.
pub(crate) fn mentions_any(text: &str, terms: &[String]) -> bool {
    let padded = format!(" {} ", normalize_text_for_match(text));
    terms.iter().any(|term| padded.contains(&format!(" {term} ")))
}

fn normalize_text_for_match(input: &str) -> String {
    input
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() {
                ch.to_lowercase().next().unwrap_or(ch)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
