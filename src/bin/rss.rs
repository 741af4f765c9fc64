use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;
use scripts::config::Config;
use scripts::feeds::{self, opml};
use scripts::{cli, dates};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rss",
    version,
    about = "Read the feeds of an OPML subscription list",
    after_help = "Examples:\n  rss feeds.opml --list\n  rss feeds.opml --read\n  rss feeds.opml --read 2024-10-31"
)]
struct Args {
    /// OPML subscription file [default: feeds.opml from config]
    opml: Option<PathBuf>,

    /// List every subscription
    #[arg(short, long, conflicts_with = "read")]
    list: bool,

    /// Print posts published on a day, oldest first [default: today]
    #[arg(long, value_name = "YYYY-MM-DD", num_args = 0..=1, value_parser = dates::parse_day)]
    read: Option<Option<NaiveDate>>,

    /// Show at most N posts
    #[arg(long, value_name = "N", requires = "read")]
    limit: Option<usize>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    cli::init_tracing();
    let args = Args::parse();
    let config = Config::discover()?;

    let path = args
        .opml
        .or_else(|| config.feeds.opml_path())
        .ok_or_else(|| anyhow::anyhow!("no subscription file given and [feeds] opml is not configured"))?;
    let subs = opml::read_opml(&path)?;

    if args.list {
        print!("{}", feeds::render_subscriptions(&subs));
        return Ok(());
    }

    let Some(day) = args.read else {
        println!("'{}' contains {} feeds.", path.display(), subs.len());
        println!("Use --list to show them or --read [YYYY-MM-DD] to read posts.");
        println!("See --help for details.");
        return Ok(());
    };

    let day = day.unwrap_or_else(dates::today);
    let client = cli::http_client(&config.http)?;
    let mut digest = feeds::read_day(&client, &subs, day, &Local).await;
    if let Some(limit) = args.limit {
        digest.entries.truncate(limit);
    }

    if digest.entries.is_empty() {
        println!("No posts for {}.", day);
    } else {
        println!("Posts for {}: {}", day, digest.entries.len());
        print!("{}", feeds::render_entries(&digest.entries, &Local));
    }
    if !digest.failed.is_empty() {
        eprintln!("{} of {} feeds could not be read: {}", digest.failed.len(), subs.len(), digest.failed.join(", "));
    }
    Ok(())
}
