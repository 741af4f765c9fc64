use anyhow::Result;
use clap::Parser;
use scripts::config::Config;
use scripts::github::{self, rest::GithubRest};
use scripts::report::{self, CollectOptions};
use scripts::cli;

#[derive(Parser, Debug)]
#[command(
    name = "gitlines",
    version,
    about = "Lines added and removed by every commit of a GitHub repository"
)]
struct Args {
    /// Repository URL, e.g. https://github.com/owner/repo
    repo_url: String,

    /// Personal access token [default: prompt, saved to .env]
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Only look at the newest N commits
    #[arg(long, value_name = "N")]
    max_commits: Option<usize>,

    /// Also count files in the repository tree at each commit (one extra request per commit)
    #[arg(long)]
    tree_files: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    cli::init_tracing();
    // .env first so clap's `env` fallback sees saved tokens.
    Config::load_env_file();
    let args = Args::parse();
    let config = Config::discover()?;

    let repo = github::parse_repo_url(&args.repo_url)?;
    let token = match args.token.filter(|t| !t.trim().is_empty()) {
        Some(token) => token.trim().to_string(),
        None => Config::github_token()?,
    };

    let client = cli::http_client(&config.http)?;
    let rest = GithubRest::new(client, token, &config.github.api_base, repo.clone());

    println!("Analyzing repository: {}", repo);
    let options = CollectOptions {
        max_commits: args.max_commits,
        tree_files: args.tree_files,
    };
    let records = report::collect_records(&rest, options).await?;
    print!("{}", report::render_report(&records, args.tree_files));
    Ok(())
}
