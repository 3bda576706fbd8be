//! Word tokenization.
//!
//! Splits text into lowercase alphabetic words. English clitics are split off
//! the way a treebank tokenizer does and then discarded, so `don't` yields
//! `do`, `Joel's` yields `joel` and `gonna` yields `gon` + `na`. Tokens that
//! still contain anything other than letters (digits, inner apostrophes,
//! hyphens) are dropped.

use std::sync::LazyLock;

use regex::Regex;

use crate::stopwords::StopWords;

// Apostrophes and hyphens join word parts, so `step-back` stays one token.
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Alphabetic}\p{N}_]+(?:['’-][\p{Alphabetic}\p{N}_]+)*")
        .expect("valid word regex")
});

/// Clitics split off the end of a word (after the apostrophe).
const CLITICS: &[&str] = &["s", "m", "d", "ll", "re", "ve"];

/// Whole words the treebank conventions split in two.
const SPLIT_WORDS: &[(&str, &str, &str)] = &[
    ("cannot", "can", "not"),
    ("gimme", "gim", "me"),
    ("gonna", "gon", "na"),
    ("gotta", "got", "ta"),
    ("lemme", "lem", "me"),
    ("wanna", "wan", "na"),
];

/// Tokenizes `text` into lowercase alphabetic words, in order.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for m in WORD_RE.find_iter(text) {
        let word = m.as_str().replace('’', "'").to_lowercase();
        push_word(&mut tokens, &word);
    }
    tokens
}

/// Tokenizes every text and drops stopwords, keeping one flat token stream.
///
/// Adjacent tokens of different texts end up next to each other, as if the
/// texts were joined with spaces.
pub fn content_tokens<'a, I>(texts: I, stopwords: &StopWords) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    texts
        .into_iter()
        .flat_map(tokenize)
        .filter(|token| !stopwords.contains(token))
        .collect()
}

fn push_word(tokens: &mut Vec<String>, word: &str) {
    if let Some(stem) = word.strip_suffix("n't") {
        push_if_alphabetic(tokens, stem);
        return;
    }
    if let Some((head, clitic)) = word.rsplit_once('\'') {
        if CLITICS.contains(&clitic) {
            push_if_alphabetic(tokens, head);
        }
        return;
    }
    if let Some((_, first, second)) = SPLIT_WORDS.iter().find(|(whole, _, _)| *whole == word) {
        tokens.push((*first).to_string());
        tokens.push((*second).to_string());
        return;
    }
    push_if_alphabetic(tokens, word);
}

fn push_if_alphabetic(tokens: &mut Vec<String>, word: &str) {
    if !word.is_empty() && word.chars().all(char::is_alphabetic) {
        tokens.push(word.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_drops_punctuation() {
        assert_eq!(
            tokenize("Embiid DROPS 50, again!"),
            vec!["embiid", "drops", "again"]
        );
    }

    #[test]
    fn negative_contractions_keep_their_stem() {
        assert_eq!(tokenize("don't can't won't"), vec!["do", "ca", "wo"]);
    }

    #[test]
    fn possessives_and_clitics_are_split_off() {
        assert_eq!(
            tokenize("Joel's knee, they're out, I'll watch"),
            vec!["joel", "knee", "they", "out", "i", "watch"]
        );
    }

    #[test]
    fn curly_apostrophes_behave_like_straight_ones() {
        assert_eq!(tokenize("Joel’s"), vec!["joel"]);
    }

    #[test]
    fn colloquial_words_are_split() {
        assert_eq!(
            tokenize("we gonna win, gotta believe"),
            vec!["we", "gon", "na", "win", "got", "ta", "believe"]
        );
    }

    #[test]
    fn tokens_with_digits_or_inner_apostrophes_are_dropped() {
        assert_eq!(tokenize("3pt shooting 76ers o'neal"), vec!["shooting"]);
    }

    #[test]
    fn hyphenated_words_are_dropped() {
        assert_eq!(tokenize("step-back three"), vec!["three"]);
        assert_eq!(tokenize("a late-game, much-needed win"), vec!["a", "win"]);
    }

    #[test]
    fn dangling_hyphens_do_not_join_words() {
        assert_eq!(tokenize("embiid - out"), vec!["embiid", "out"]);
        assert_eq!(tokenize("ref-"), vec!["ref"]);
    }

    #[test]
    fn content_tokens_drop_stopwords_across_texts() {
        let stopwords = StopWords::english();
        let tokens = content_tokens(["The Sixers are back", "Embiid is out"], &stopwords);
        assert_eq!(tokens, vec!["sixers", "back", "embiid"]);
    }
}
