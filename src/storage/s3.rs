use super::sigv4::{uri_encode, SigV4Signer};
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{Body, Client};
use ring::digest;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use url::Url;

const HASH_CHUNK: usize = 64 * 1024;

pub struct S3Client {
    client: Client,
    signer: SigV4Signer,
    origin: String,
    host: String,
}

#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub url: String,
    pub etag: Option<String>,
    pub bytes: u64,
}

impl S3Client {
    pub fn new(client: Client, signer: SigV4Signer, endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint).with_context(|| format!("invalid storage endpoint: {}", endpoint))?;
        let host_name = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("storage endpoint has no host: {}", endpoint))?;
        // `port()` is None for the scheme's default port, which must stay out
        // of the signed Host header.
        let host = match url.port() {
            Some(port) => format!("{}:{}", host_name, port),
            None => host_name.to_string(),
        };
        Ok(Self {
            client,
            signer,
            origin: format!("{}://{}", url.scheme(), host),
            host,
        })
    }

    /// Path-style object path, URI-encoded.
    pub fn canonical_uri(bucket: &str, key: &str) -> String {
        format!("/{}/{}", uri_encode(bucket, false), uri_encode(key, true))
    }

    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}{}", self.origin, Self::canonical_uri(bucket, key))
    }

    /// Upload a local file as `bucket/key` with a single signed PUT. The file
    /// is read twice: once to hash the payload, once streamed as the body.
    pub async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<UploadReceipt> {
        let size = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();
        let payload_hash = hash_file(path).await?;

        let uri = Self::canonical_uri(bucket, key);
        let url = format!("{}{}", self.origin, uri);
        let headers = self
            .signer
            .sign("PUT", &self.host, &uri, &[], &payload_hash, Utc::now());

        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let body = Body::wrap_stream(ReaderStream::new(file));

        let mut req = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_LENGTH, size)
            .body(body);
        for (k, v) in &headers {
            req = req.header(k, v);
        }

        tracing::info!(bucket, key, bytes = size, "uploading");
        let resp = req.send().await.context("upload request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("upload failed ({}): {}", status, body);
        }

        let etag = resp
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim_matches('"').to_string());

        Ok(UploadReceipt { url, etag, bytes: size })
    }
}

/// Hex SHA-256 of a file's contents, read in chunks.
pub async fn hash_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut ctx = digest::Context::new(&digest::SHA256);
    let mut buf = vec![0u8; HASH_CHUNK];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if n == 0 {
            break;
        }
        ctx.update(&buf[..n]);
    }
    Ok(hex::encode(ctx.finish()))
}
