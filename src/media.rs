//! Video downloads through the `yt-dlp` executable.
//!
//! Highest-quality mode asks for separate best video and audio streams and
//! has `ffmpeg` merge them into an mp4, so it needs `ffmpeg` available.

use crate::config::MediaConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

const FORMAT_BEST: &str = "best";
const FORMAT_HIGHEST: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best";

/// Resolved external programs.
#[derive(Debug, Clone)]
pub struct Tools {
    pub ytdlp: PathBuf,
    pub ffmpeg: Option<PathBuf>,
}

/// Find `yt-dlp` (required) and `ffmpeg` (optional), honoring configured paths.
pub fn locate_tools(config: &MediaConfig) -> Result<Tools> {
    let ytdlp = match &config.ytdlp_path {
        Some(path) => PathBuf::from(path),
        None => which::which("yt-dlp").context("yt-dlp not found in PATH")?,
    };
    let ffmpeg = match &config.ffmpeg_path {
        Some(path) => Some(PathBuf::from(path)),
        None => which::which("ffmpeg").ok(),
    };
    tracing::debug!(ytdlp = %ytdlp.display(), ffmpeg = ?ffmpeg, "located tools");
    Ok(Tools { ytdlp, ffmpeg })
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub output_dir: PathBuf,
    pub highest_quality: bool,
    pub no_check_certificates: bool,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, output_dir: impl Into<PathBuf>, highest_quality: bool) -> Self {
        Self {
            url: url.into(),
            output_dir: output_dir.into(),
            highest_quality,
            no_check_certificates: false,
        }
    }

    pub fn format(&self) -> &'static str {
        if self.highest_quality {
            FORMAT_HIGHEST
        } else {
            FORMAT_BEST
        }
    }

    /// yt-dlp output template. HQ downloads get an " HQ" suffix so both
    /// variants of one video can sit side by side.
    pub fn output_template(&self) -> String {
        let name = if self.highest_quality {
            "%(title)s HQ.%(ext)s"
        } else {
            "%(title)s.%(ext)s"
        };
        self.output_dir.join(name).to_string_lossy().to_string()
    }

    /// Full yt-dlp argument list, URL last.
    pub fn args(&self, ffmpeg: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            self.format().to_string(),
            "--output".to_string(),
            self.output_template(),
            "--progress".to_string(),
        ];
        if self.highest_quality {
            args.push("--merge-output-format".to_string());
            args.push("mp4".to_string());
            if let Some(path) = ffmpeg {
                args.push("--ffmpeg-location".to_string());
                args.push(path.to_string_lossy().to_string());
            }
        }
        if self.no_check_certificates {
            args.push("--no-check-certificates".to_string());
        }
        args.push(self.url.clone());
        args
    }
}

/// Run yt-dlp with its progress output going straight to the terminal.
pub async fn download(tools: &Tools, request: &DownloadRequest) -> Result<()> {
    if request.highest_quality && tools.ffmpeg.is_none() {
        anyhow::bail!("highest quality mode needs ffmpeg to merge streams, but ffmpeg was not found");
    }

    tokio::fs::create_dir_all(&request.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", request.output_dir.display()))?;

    let args = request.args(tools.ffmpeg.as_deref());
    tracing::info!(url = %request.url, hq = request.highest_quality, "starting yt-dlp");
    tracing::debug!(?args, "yt-dlp arguments");

    let status = Command::new(&tools.ytdlp)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .context("Failed to execute yt-dlp")?;

    if !status.success() {
        anyhow::bail!("yt-dlp failed ({})", status);
    }
    Ok(())
}

/// Metadata returned by `yt-dlp --dump-json`.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
}

impl VideoMetadata {
    pub fn summary(&self) -> String {
        let mut out = format!("{} [{}]", self.title, self.id);
        if let Some(uploader) = &self.uploader {
            out.push_str(&format!("\n  uploader: {}", uploader));
        }
        if let Some(secs) = self.duration {
            let secs = secs.round() as u64;
            out.push_str(&format!(
                "\n  duration: {}:{:02}:{:02}",
                secs / 3600,
                (secs % 3600) / 60,
                secs % 60
            ));
        }
        if let Some(date) = &self.upload_date {
            out.push_str(&format!("\n  uploaded: {}", date));
        }
        out
    }
}

/// Fetch video metadata without downloading.
pub async fn fetch_metadata(tools: &Tools, url: &str, no_check_certificates: bool) -> Result<VideoMetadata> {
    let mut cmd = Command::new(&tools.ytdlp);
    cmd.args(["--dump-json", "--no-playlist"]);
    if no_check_certificates {
        cmd.arg("--no-check-certificates");
    }
    cmd.arg(url);

    let output = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .context("Failed to execute yt-dlp for metadata")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("yt-dlp metadata fetch failed: {}", stderr.trim());
    }

    serde_json::from_slice(&output.stdout).context("Failed to parse yt-dlp JSON output")
}
