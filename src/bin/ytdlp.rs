use anyhow::Result;
use clap::Parser;
use scripts::config::Config;
use scripts::{cli, media};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ytdlp", version, about = "Download videos with yt-dlp")]
struct Args {
    /// Video URL
    url: String,

    /// Best mp4 video plus m4a audio, merged by ffmpeg (also `-hq`)
    #[arg(long = "highest-quality", visible_alias = "hq")]
    highest_quality: bool,

    /// Download directory [default: media.output_dir or ~/Downloads/FromYouTube]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print title, uploader and duration without downloading
    #[arg(long)]
    info: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    cli::init_tracing();
    let args = Args::parse_from(cli::rewrite_flag(std::env::args(), "-hq", "--highest-quality"));
    let config = Config::discover()?;
    let tools = media::locate_tools(&config.media)?;

    if args.info {
        let meta = media::fetch_metadata(&tools, &args.url, config.media.no_check_certificates).await?;
        println!("{}", meta.summary());
        return Ok(());
    }

    let output_dir = args.output.unwrap_or_else(|| config.media.output_dir());
    let mut request = media::DownloadRequest::new(args.url, output_dir, args.highest_quality);
    request.no_check_certificates = config.media.no_check_certificates;

    media::download(&tools, &request).await?;
    println!("Download completed: {}", request.output_dir.display());
    Ok(())
}
