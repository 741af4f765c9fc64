use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use reqwest::Client;
use scripts::config::{self, Config};
use scripts::mastodon::credentials::{self, ClientCredentials, UserCredentials};
use scripts::mastodon::{self, rest::MastodonRest};
use scripts::{cli, dates};
use std::io::Read;

#[derive(Parser, Debug)]
#[command(name = "toot", version, about = "Post a status to Mastodon")]
struct Args {
    /// Status text. Leave it out and pipe text on stdin for multi-line posts.
    #[arg(conflicts_with_all = ["auth", "read"])]
    message: Option<String>,

    /// One-time setup: register the app and authorize this account
    #[arg(long, conflicts_with = "read")]
    auth: bool,

    /// Show home timeline posts for a day instead of posting [default: today]
    #[arg(long, value_name = "YYYY-MM-DD", num_args = 0..=1, value_parser = dates::parse_day)]
    read: Option<Option<NaiveDate>>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    cli::init_tracing();
    let args = Args::parse();
    let config = Config::discover()?;
    let client = cli::http_client(&config.http)?;

    if args.auth {
        return authorize(&config, client).await;
    }

    let user_path = config.mastodon.user_credentials_path();
    let user: UserCredentials = credentials::load(&user_path)
        .context("not logged in; run `toot --auth` for first-time setup")?;
    let rest = MastodonRest::with_user(client, &user);

    if let Some(day) = args.read {
        let day = day.unwrap_or_else(dates::today);
        return read_day(&rest, day).await;
    }

    let message = match args.message {
        Some(message) => message,
        None => message_from_stdin()?,
    };
    let text = mastodon::validate_message(&message)?;
    let status = rest.post_status(text).await?;
    println!("Posted: {}", status.url.unwrap_or(status.id));
    Ok(())
}

fn message_from_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_tty() {
        anyhow::bail!("no message given; pass it as an argument or pipe it on stdin (first run: `toot --auth`)");
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text).context("failed to read message from stdin")?;
    Ok(text)
}

async fn read_day(rest: &MastodonRest, day: NaiveDate) -> Result<()> {
    let statuses = mastodon::statuses_on_day(rest, day, &Local).await?;
    if statuses.is_empty() {
        println!("No posts for {}.", day);
        return Ok(());
    }
    println!("Posts for {}: {}", day, statuses.len());
    for status in &statuses {
        println!("{}", mastodon::render_status(status, &Local));
    }
    Ok(())
}

async fn authorize(cfg: &Config, client: Client) -> Result<()> {
    let settings = &cfg.mastodon;
    let client_path = settings.client_credentials_path();

    let app: ClientCredentials = if client_path.exists() {
        credentials::load(&client_path)?
    } else {
        println!("Registering application with {}...", settings.api_base);
        let app = MastodonRest::new(client.clone(), &settings.api_base)
            .register_app(&settings.app_name, settings.website.as_deref())
            .await?;
        credentials::save(&client_path, &app)?;
        println!("Application registered, saved to {}", client_path.display());
        app
    };

    let url = MastodonRest::authorize_url(&app)?;
    println!();
    println!("1. Open this link to authorize the app:");
    println!("   {}", url.as_str().bold());
    println!("2. Log in to Mastodon and approve access");
    println!("3. Copy the authorization code shown in the browser");
    println!();
    let code = config::prompt("4. Authorization code")?;

    let user = MastodonRest::new(client, &app.api_base).exchange_code(&app, &code).await?;
    let user_path = settings.user_credentials_path();
    credentials::save(&user_path, &user)?;
    println!();
    println!("{} token saved to {}", "Done:".green(), user_path.display());
    Ok(())
}
