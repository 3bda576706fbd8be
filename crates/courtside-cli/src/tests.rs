use std::path::PathBuf;

use clap::Parser;
use courtside_reddit::{SortOrder, TimeFilter};

use super::{Cli, Commands};

#[test]
fn recent_uses_defaults() {
    let cli = Cli::try_parse_from(["courtside", "recent"]).expect("expected valid cli args");

    let Commands::Recent(args) = cli.command else {
        panic!("expected recent command");
    };
    assert_eq!(args.subreddit, "nba");
    assert_eq!(args.days, 14);
    assert_eq!(args.limit, 1000);
    assert_eq!(args.top, 20);
    assert!(!args.network);
    assert!(args.dot.is_none());
    assert!(args.export.is_none());
    assert!(!args.no_browser);
    assert!(cli.log_level.is_none());
}

#[test]
fn recent_accepts_outputs() {
    let cli = Cli::try_parse_from([
        "courtside",
        "recent",
        "--subreddit",
        "sixers",
        "--network",
        "--dot",
        "network.dot",
        "--export",
        "titles.csv",
        "--no-browser",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Recent(ref args)
            if args.subreddit == "sixers"
                && args.network
                && args.dot.as_deref() == Some(std::path::Path::new("network.dot"))
                && args.export == Some(PathBuf::from("titles.csv"))
                && args.no_browser
    ));
}

#[test]
fn comments_defaults_search_for_embiid() {
    let cli = Cli::try_parse_from(["courtside", "comments"]).expect("expected valid cli args");

    let Commands::Comments(args) = cli.command else {
        panic!("expected comments command");
    };
    assert_eq!(args.keywords, vec!["Embiid".to_string(), "Joel".to_string()]);
    assert_eq!(args.days, 65);
    assert_eq!(args.time_filter, TimeFilter::Year);
    assert_eq!(args.sort, SortOrder::New);
    assert_eq!(args.comment_limit, 100);
    assert_eq!(args.top, 300);
    assert_eq!(args.export, PathBuf::from("word_frequencies.csv"));
}

#[test]
fn comments_repeated_keywords_replace_defaults() {
    let cli = Cli::try_parse_from([
        "courtside",
        "comments",
        "--keyword",
        "Maxey",
        "--keyword",
        "Tyrese",
        "--sort",
        "top",
        "--time-filter",
        "month",
    ])
    .expect("expected valid cli args");

    let Commands::Comments(args) = cli.command else {
        panic!("expected comments command");
    };
    assert_eq!(args.keywords, vec!["Maxey".to_string(), "Tyrese".to_string()]);
    assert_eq!(args.sort, SortOrder::Top);
    assert_eq!(args.time_filter, TimeFilter::Month);
}

#[test]
fn comments_rejects_unknown_sort() {
    let result = Cli::try_parse_from(["courtside", "comments", "--sort", "sideways"]);
    assert!(result.is_err());
}

#[test]
fn share_parses_groups() {
    let cli = Cli::try_parse_from([
        "courtside",
        "share",
        "--input",
        "word_frequencies.csv",
        "--group",
        "injury=injured,injury,injuries",
        "--group",
        "refs",
    ])
    .expect("expected valid cli args");

    let Commands::Share(args) = cli.command else {
        panic!("expected share command");
    };
    assert_eq!(args.groups.len(), 2);
    assert_eq!(args.groups[0].name, "injury");
    assert_eq!(args.groups[0].variants.len(), 3);
    assert_eq!(args.groups[1].variants, vec!["refs".to_string()]);
}

#[test]
fn share_requires_input() {
    assert!(Cli::try_parse_from(["courtside", "share"]).is_err());
}

#[test]
fn chart_with_global_log_level() {
    let cli = Cli::try_parse_from([
        "courtside",
        "chart",
        "--input",
        "word_frequencies.csv",
        "--top",
        "5",
        "--log-level",
        "debug",
    ])
    .expect("expected valid cli args");

    assert_eq!(cli.log_level.as_deref(), Some("debug"));
    assert!(matches!(cli.command, Commands::Chart(ref args) if args.top == 5));
    assert!(!cli.command.needs_reddit());
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["courtside"]).is_err());
}

#[test]
fn days_must_be_positive_and_bounded() {
    for days in ["0", "-3", "36501", "1000000000"] {
        assert!(
            Cli::try_parse_from(["courtside", "recent", "--days", days]).is_err(),
            "recent --days {days} should be rejected"
        );
        assert!(
            Cli::try_parse_from(["courtside", "comments", "--days", days]).is_err(),
            "comments --days {days} should be rejected"
        );
    }

    let cli = Cli::try_parse_from(["courtside", "comments", "--days", "36500"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Comments(ref args) if args.days == 36_500));

    let cli = Cli::try_parse_from(["courtside", "recent", "--days", "1"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Recent(ref args) if args.days == 1));
}
