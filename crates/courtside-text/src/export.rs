//! `Word,Frequency` CSV export and read-back.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::mem::take;
use std::path::Path;

use crate::error::TextError;

const HEADER: [&str; 2] = ["Word", "Frequency"];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write>(w: &mut W, row: &[&str]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}

/// Splits CSV text into rows of fields. Tolerates CRLF and quoted fields with
/// embedded separators, quotes and newlines. Blank lines are skipped.
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                if row.len() == 1 && row[0].is_empty() {
                    row.clear();
                } else {
                    rows.push(take(&mut row));
                }
            }
            _ => field.push(ch),
        }
    }

    row.push(field);
    if !(row.len() == 1 && row[0].is_empty()) {
        rows.push(row);
    }
    rows
}

/// Writes `rows` as a `Word,Frequency` CSV file with a header row.
///
/// # Errors
///
/// Returns [`TextError::Io`] if the file cannot be created or written.
pub fn write_frequencies_csv(path: &Path, rows: &[(String, u64)]) -> Result<(), TextError> {
    let io_err = |source| TextError::Io {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut w = BufWriter::new(file);
    write_row(&mut w, &HEADER).map_err(io_err)?;
    for (word, count) in rows {
        let count = count.to_string();
        write_row(&mut w, &[word.as_str(), count.as_str()]).map_err(io_err)?;
    }
    w.flush().map_err(io_err)?;

    tracing::info!(path = %path.display(), rows = rows.len(), "wrote word frequencies");
    Ok(())
}

/// Reads a file written by [`write_frequencies_csv`]. The header row is
/// optional.
///
/// # Errors
///
/// - [`TextError::Io`] if the file cannot be read.
/// - [`TextError::Malformed`] if a row does not have exactly two fields or
///   its frequency is not a non-negative integer.
pub fn read_frequencies_csv(path: &Path) -> Result<Vec<(String, u64)>, TextError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| TextError::Io {
        path: display.clone(),
        source,
    })?;

    let mut rows = parse_rows(&text).into_iter().enumerate().peekable();
    if let Some((_, first)) = rows.peek() {
        if first.first().is_some_and(|c| c.trim().eq_ignore_ascii_case(HEADER[0])) {
            rows.next();
        }
    }

    rows.map(|(i, row)| {
        let malformed = |reason: String| TextError::Malformed {
            path: display.clone(),
            line: i + 1,
            reason,
        };
        let [word, count] = row.as_slice() else {
            return Err(malformed(format!("expected 2 fields, found {}", row.len())));
        };
        let count = count
            .trim()
            .parse::<u64>()
            .map_err(|e| malformed(format!("frequency '{count}': {e}")))?;
        Ok((word.clone(), count))
    })
    .collect()
}
