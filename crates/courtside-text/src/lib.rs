//! Text analysis for collected Reddit posts and comments.
//!
//! Everything here is synchronous and free of I/O apart from the CSV export:
//! tokenize, drop stopwords, count, then derive co-occurrence networks,
//! term-share percentages and plain-text renderings from the counts.

pub mod cooccurrence;
pub mod error;
pub mod export;
pub mod frequency;
pub mod render;
pub mod share;
pub mod stopwords;
pub mod tokenize;

pub use cooccurrence::{cooccurrence, CooccurrenceGraph, Edge, DEFAULT_MIN_COUNT};
pub use error::TextError;
pub use export::{read_frequencies_csv, write_frequencies_csv};
pub use frequency::FrequencyTable;
pub use render::{render_bar_chart, render_dot};
pub use share::{default_groups, term_share, TermGroup, TermShare};
pub use stopwords::StopWords;
pub use tokenize::{content_tokens, tokenize};
