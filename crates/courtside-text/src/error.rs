use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A row of a frequency export could not be understood.
    #[error("malformed frequency file {path}, line {line}: {reason}")]
    Malformed {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("invalid term group '{0}' (expected name=word1,word2)")]
    InvalidGroup(String),
}
