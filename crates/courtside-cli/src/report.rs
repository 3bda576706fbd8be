use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use courtside_text::{
    default_groups, read_frequencies_csv, render_bar_chart, term_share, FrequencyTable, TermGroup,
    TermShare,
};

const CHART_WIDTH: usize = 50;

#[derive(Debug, Args)]
pub(crate) struct ShareArgs {
    /// CSV file written by `comments --export`
    #[arg(long)]
    pub input: PathBuf,

    /// Term group as `name=word1,word2`; repeat for several (defaults to
    /// dirty, injury, foul and ft)
    #[arg(long = "group")]
    pub groups: Vec<TermGroup>,
}

#[derive(Debug, Args)]
pub(crate) struct ChartArgs {
    /// CSV file written by `comments --export` or `recent --export`
    #[arg(long)]
    pub input: PathBuf,

    /// Number of rows to draw
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

pub(crate) fn print_top_words(rows: &[(String, u64)]) {
    if rows.is_empty() {
        println!("No words to report.");
        return;
    }
    print!("{}", render_bar_chart(rows, CHART_WIDTH));
}

pub(crate) fn write_text(path: &Path, text: &str) -> anyhow::Result<()> {
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote file");
    Ok(())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_shares(total: u64, shares: &[TermShare]) -> String {
    let mut out = format!("Total word count: {total}\nWord counts and percentages:\n");
    for share in shares {
        let _ = writeln!(
            out,
            "{}: {} ({:.2}%)",
            capitalize(&share.name),
            share.count,
            share.percent
        );
    }
    out
}

/// Prints each term group's share of an exported word count.
///
/// # Errors
///
/// Returns an error if the input file cannot be read or parsed.
pub(crate) fn run_share(args: &ShareArgs) -> anyhow::Result<()> {
    let rows = read_frequencies_csv(&args.input)?;
    let table = FrequencyTable::from_counts(rows);
    let groups = if args.groups.is_empty() {
        default_groups()
    } else {
        args.groups.clone()
    };

    let shares = term_share(&table, &groups);
    print!("{}", format_shares(table.total(), &shares));
    Ok(())
}

/// Draws the most frequent rows of an exported word count.
///
/// # Errors
///
/// Returns an error if the input file cannot be read or parsed.
pub(crate) fn run_chart(args: &ChartArgs) -> anyhow::Result<()> {
    let rows = read_frequencies_csv(&args.input)?;
    let table = FrequencyTable::from_counts(rows);
    print_top_words(&table.most_common(args.top));
    Ok(())
}
