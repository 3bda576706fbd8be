use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::Args;
use courtside_core::AppConfig;
use courtside_reddit::{
    drain_submissions, AuthorizationSession, RateLimitPolicy, RedditClient, SearchRequest,
    SortOrder, TimeFilter, TimeWindow,
};
use courtside_text::{StopWords, DEFAULT_MIN_COUNT};

use crate::{analyze, auth, report};

/// Accepted `--days` values: one day up to roughly a century.
const DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=36_500;

#[derive(Debug, Args)]
pub(crate) struct RecentArgs {
    /// Community to read, without the `r/` prefix
    #[arg(long, default_value = "nba")]
    pub subreddit: String,

    /// Only titles of posts created in the last N days are analysed
    #[arg(
        long,
        default_value_t = 14,
        value_parser = clap::value_parser!(i64).range(DAYS_RANGE)
    )]
    pub days: i64,

    /// Maximum listing items to fetch (0 reads until the listing ends)
    #[arg(long, default_value_t = 1000)]
    pub limit: usize,

    /// Number of most frequent words to report
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Print the co-occurrence network of the top words as Graphviz DOT
    #[arg(long)]
    pub network: bool,

    /// Write the co-occurrence network to this DOT file
    #[arg(long)]
    pub dot: Option<PathBuf>,

    /// Write the top words to this CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Print the authorization URL without launching a browser
    #[arg(long)]
    pub no_browser: bool,
}

#[derive(Debug, Args)]
pub(crate) struct CommentsArgs {
    /// Community to search, without the `r/` prefix
    #[arg(long, default_value = "nba")]
    pub subreddit: String,

    /// Title keyword; repeat for several (posts matching any are kept)
    #[arg(long = "keyword", default_values = ["Embiid", "Joel"])]
    pub keywords: Vec<String>,

    /// Only posts created in the last N days are kept
    #[arg(
        long,
        default_value_t = 65,
        value_parser = clap::value_parser!(i64).range(DAYS_RANGE)
    )]
    pub days: i64,

    /// Provider-side time filter: hour, day, week, month, year or all
    #[arg(long, default_value = "year")]
    pub time_filter: TimeFilter,

    /// Search sort: relevance, hot, top, new or comments
    #[arg(long, default_value = "new")]
    pub sort: SortOrder,

    /// Maximum comments collected per post
    #[arg(long, default_value_t = 100)]
    pub comment_limit: usize,

    /// Number of most frequent words to report and export
    #[arg(long, default_value_t = 300)]
    pub top: usize,

    /// CSV file receiving the top words
    #[arg(long, default_value = "word_frequencies.csv")]
    pub export: PathBuf,

    /// Print the authorization URL without launching a browser
    #[arg(long)]
    pub no_browser: bool,
}

fn reddit_client(
    config: &AppConfig,
    session: AuthorizationSession,
) -> anyhow::Result<RedditClient> {
    let policy = RateLimitPolicy::new(
        config.rate_limit_max_retries,
        Duration::from_secs(config.rate_limit_max_wait_secs),
    );
    Ok(RedditClient::new(
        session,
        &config.user_agent,
        config.request_timeout_secs,
        policy,
    )?)
}

/// Authorizes, lists the community's newest posts and analyses the titles
/// created inside the window.
///
/// # Errors
///
/// Returns an error if authorization fails, collection hits a fatal error
/// (expired session, rate limit ceiling), or an output file cannot be
/// written.
pub(crate) async fn run_recent(config: &AppConfig, args: &RecentArgs) -> anyhow::Result<()> {
    let session = auth::authorize(config, args.no_browser).await?;
    let client = reddit_client(config, session)?;

    let window = TimeWindow::last_days(args.days, Utc::now());
    let max_results = (args.limit > 0).then_some(args.limit);
    let posts = drain_submissions(client.list_recent(&args.subreddit, max_results)).await?;

    let titles: Vec<&str> = posts
        .iter()
        .filter(|post| window.contains(post.created_at))
        .map(|post| post.title.as_str())
        .collect();
    tracing::info!(
        subreddit = %args.subreddit,
        fetched = posts.len(),
        in_window = titles.len(),
        "collected post titles"
    );
    println!(
        "Analysed {} post titles from r/{} (last {} days)",
        titles.len(),
        args.subreddit,
        args.days
    );

    let analysis = analyze::analyze(titles, &StopWords::english(), args.top);
    report::print_top_words(&analysis.top);

    if let Some(path) = &args.export {
        courtside_text::write_frequencies_csv(path, &analysis.top)?;
    }

    if args.network || args.dot.is_some() {
        let graph = analysis.network(DEFAULT_MIN_COUNT);
        tracing::info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "built co-occurrence network"
        );
        let dot = courtside_text::render_dot(&graph);
        if args.network {
            println!("{dot}");
        }
        if let Some(path) = &args.dot {
            report::write_text(path, &dot)?;
        }
    }

    Ok(())
}

/// Authorizes, searches the community for posts mentioning the keywords,
/// collects their comment threads and exports the most frequent words.
///
/// Posts whose comments fail to load contribute nothing; the run goes on.
///
/// # Errors
///
/// Returns an error if authorization fails, collection hits a fatal error,
/// or the export file cannot be written.
pub(crate) async fn run_comments(config: &AppConfig, args: &CommentsArgs) -> anyhow::Result<()> {
    let session = auth::authorize(config, args.no_browser).await?;
    let client = reddit_client(config, session)?;

    let request = SearchRequest {
        keywords: args.keywords.clone(),
        window: TimeWindow::last_days(args.days, Utc::now()),
        sort: args.sort,
        time_filter: args.time_filter,
        max_results: None,
    };
    let posts = drain_submissions(client.search_posts(&args.subreddit, &request)).await?;
    println!(
        "Found {} posts mentioning {} in r/{}",
        posts.len(),
        args.keywords.join(" or "),
        args.subreddit
    );

    let threads = client.collect_comments(&posts, args.comment_limit).await?;
    let bodies: Vec<&str> = threads
        .iter()
        .flat_map(|thread| thread.comments.iter().map(|c| c.body.as_str()))
        .collect();
    tracing::info!(
        posts = posts.len(),
        comments = bodies.len(),
        "collected comments"
    );

    let analysis = analyze::analyze(bodies, &StopWords::with_sports_extras(), args.top);
    println!(
        "Counted {} words ({} distinct) across {} comments",
        analysis.table.total(),
        analysis.table.len(),
        threads.iter().map(|t| t.comments.len()).sum::<usize>()
    );
    report::print_top_words(&analysis.top);
    courtside_text::write_frequencies_csv(&args.export, &analysis.top)?;
    println!("Word frequencies written to {}", args.export.display());

    Ok(())
}
