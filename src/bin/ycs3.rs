use anyhow::Result;
use clap::Parser;
use scripts::config::Config;
use scripts::storage::{self, s3::S3Client, sigv4::SigV4Signer};
use scripts::cli;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ycs3", version, about = "Upload a file to S3-compatible object storage")]
struct Args {
    /// Local file to upload
    file: PathBuf,

    /// Destination bucket [default: storage.bucket from config]
    #[arg(long, env = "S3_BUCKET")]
    bucket: Option<String>,

    /// Object key [default: the file name]
    #[arg(long)]
    key: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    cli::init_tracing();
    Config::load_env_file();
    let args = Args::parse();
    let config = Config::discover()?;

    if !args.file.is_file() {
        anyhow::bail!("{} is not a file", args.file.display());
    }
    let bucket = args
        .bucket
        .or_else(|| config.storage.bucket.clone())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| anyhow::anyhow!("no bucket: set [storage] bucket in the config, S3_BUCKET, or --bucket"))?;
    let key = match args.key {
        Some(key) => key,
        None => storage::default_key(&args.file)?,
    };

    let (access_key, secret_key) = config.storage_keys()?;
    let signer = SigV4Signer::new(access_key, secret_key, &config.storage.region, "s3");
    let s3 = S3Client::new(cli::upload_client(&config.http)?, signer, &config.storage.endpoint)?;

    let receipt = s3.put_file(&bucket, &key, &args.file).await?;
    println!("Uploaded {} bytes to {}", receipt.bytes, receipt.url);
    if let Some(etag) = receipt.etag {
        tracing::info!(etag = %etag, "upload acknowledged");
    }
    Ok(())
}
