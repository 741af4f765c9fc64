use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";
const CONFIG_ENV: &str = "SCRIPTS_CONFIG";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub media: MediaConfig,
    pub github: GithubConfig,
    pub storage: StorageConfig,
    pub mastodon: MastodonConfig,
    pub feeds: FeedsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_s: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_s: 30,
            user_agent: format!("scripts/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MediaConfig {
    pub output_dir: Option<String>,
    pub ytdlp_path: Option<String>,
    pub ffmpeg_path: Option<String>,
    /// Pass `--no-check-certificates` to yt-dlp.
    pub no_check_certificates: bool,
}

impl MediaConfig {
    /// Download directory: configured value, or `<Downloads>/FromYouTube`.
    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => expand_home(dir),
            None => dirs::download_dir()
                .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("FromYouTube"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GithubConfig {
    pub api_base: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://storage.yandexcloud.net".to_string(),
            region: "ru-central1".to_string(),
            bucket: None,
            access_key: None,
            secret_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MastodonConfig {
    pub api_base: String,
    pub app_name: String,
    pub website: Option<String>,
    pub client_credentials: Option<String>,
    pub user_credentials: Option<String>,
}

impl Default for MastodonConfig {
    fn default() -> Self {
        Self {
            api_base: "https://fosstodon.org".to_string(),
            app_name: "scripts_tooter".to_string(),
            website: None,
            client_credentials: None,
            user_credentials: None,
        }
    }
}

impl MastodonConfig {
    pub fn client_credentials_path(&self) -> PathBuf {
        self.client_credentials
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| config_dir().join("toot_clientcred.toml"))
    }

    pub fn user_credentials_path(&self) -> PathBuf {
        self.user_credentials
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| config_dir().join("toot_usercred.toml"))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FeedsConfig {
    /// Subscription list used when `rss` is called without a file.
    pub opml: Option<String>,
}

impl FeedsConfig {
    pub fn opml_path(&self) -> Option<PathBuf> {
        self.opml.as_deref().map(expand_home)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))?;
        Ok(config)
    }

    /// `$SCRIPTS_CONFIG` if set, else `<config dir>/scripts/config.toml` if it
    /// exists, else built-in defaults.
    pub fn discover() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Self::load(&expand_home(&path));
            }
        }
        let path = config_dir().join("config.toml");
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            return Self::load(&path);
        }
        Ok(Self::default())
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        match dotenvy::from_filename(ENV_FILE) {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "failed to read {}", ENV_FILE),
        }
    }

    /// GitHub personal access token from the environment, or prompted.
    /// Prompted values are saved to .env for future runs.
    pub fn github_token() -> Result<String> {
        match std::env::var("GITHUB_TOKEN") {
            Ok(token) if !token.is_empty() => Ok(sanitize_key(&token)),
            _ => {
                let token = prompt_secret("GitHub personal access token")?;
                save_env_var("GITHUB_TOKEN", &token);
                Ok(token)
            }
        }
    }

    /// Storage access/secret key pair. Environment first, then the config
    /// file, then an interactive prompt.
    pub fn storage_keys(&self) -> Result<(String, String)> {
        let access = match std::env::var("AWS_ACCESS_KEY_ID") {
            Ok(key) if !key.is_empty() => sanitize_key(&key),
            _ => match &self.storage.access_key {
                Some(key) if !key.is_empty() => sanitize_key(key),
                _ => {
                    let key = prompt_secret("Storage access key id")?;
                    save_env_var("AWS_ACCESS_KEY_ID", &key);
                    key
                }
            },
        };
        let secret = match std::env::var("AWS_SECRET_ACCESS_KEY") {
            Ok(key) if !key.is_empty() => sanitize_key(&key),
            _ => match &self.storage.secret_key {
                Some(key) if !key.is_empty() => sanitize_key(key),
                _ => {
                    let key = prompt_secret("Storage secret access key")?;
                    save_env_var("AWS_SECRET_ACCESS_KEY", &key);
                    key
                }
            },
        };
        Ok((access, secret))
    }
}

/// Per-user directory holding config.toml and credential files.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scripts")
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) => {
            let home = dirs::home_dir().unwrap_or_default();
            home.join(rest.trim_start_matches(['/', '\\']))
        }
        None => PathBuf::from(path),
    }
}

pub fn prompt(label: &str) -> Result<String> {
    print!("  {} > ", label);
    io::stdout().flush()?;
    read_answer(&mut io::stdin().lock(), label)
}

/// Prompt for a token or key. The answer is cleaned like values taken
/// from the environment.
fn prompt_secret(label: &str) -> Result<String> {
    print!("  {} > ", label);
    io::stdout().flush()?;
    read_secret(&mut io::stdin().lock(), label)
}

fn read_answer(input: &mut impl BufRead, label: &str) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("{} cannot be empty", label);
    }
    Ok(value)
}

fn read_secret(input: &mut impl BufRead, label: &str) -> Result<String> {
    let value = sanitize_key(&read_answer(input, label)?);
    if value.is_empty() {
        anyhow::bail!("{} cannot be empty", label);
    }
    Ok(value)
}

/// Strip carriage returns, BOM, and other invisible chars from a key/path value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

/// Append a KEY=VALUE line to .env and set it in the current process.
fn save_env_var(key: &str, value: &str) {
    std::env::set_var(key, value);
    let path = Path::new(ENV_FILE);
    let mut contents = std::fs::read_to_string(path).unwrap_or_default();
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&format!("{}={}\n", key, value));
    if let Err(e) = std::fs::write(path, contents) {
        tracing::warn!(error = %e, key, "could not save value to {}", ENV_FILE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.http.timeout_s, 30);
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.storage.region, "ru-central1");
        assert_eq!(config.storage.bucket.as_deref(), Some("snatcher"));
        assert_eq!(config.mastodon.api_base, "https://fosstodon.org");
        assert!(!config.media.no_check_certificates);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("[storage]\nbucket = \"b\"\n").unwrap();
        assert_eq!(config.storage.bucket.as_deref(), Some("b"));
        assert_eq!(config.storage.endpoint, "https://storage.yandexcloud.net");
        assert_eq!(config.http.timeout_s, 30);
        assert!(config.http.user_agent.starts_with("scripts/"));
        assert_eq!(config.mastodon.app_name, "scripts_tooter");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.storage.bucket.is_none());
        assert!(config.feeds.opml_path().is_none());
        assert!(config.media.output_dir().ends_with("FromYouTube"));
    }

    #[test]
    fn test_configured_media_dir_wins() {
        let config: Config = toml::from_str("[media]\noutput_dir = \"/tmp/videos\"\n").unwrap();
        assert_eq!(config.media.output_dir(), PathBuf::from("/tmp/videos"));
    }

    #[test]
    fn test_expand_home() {
        let home = dirs::home_dir().unwrap_or_default();
        assert_eq!(expand_home("~/feeds.opml"), home.join("feeds.opml"));
        assert_eq!(expand_home("/etc/feeds.opml"), PathBuf::from("/etc/feeds.opml"));
        assert_eq!(expand_home("relative/x"), PathBuf::from("relative/x"));
    }

    #[test]
    fn test_credential_paths_default_to_config_dir() {
        let config = MastodonConfig::default();
        assert_eq!(
            config.client_credentials_path(),
            config_dir().join("toot_clientcred.toml")
        );
        assert_eq!(
            config.user_credentials_path(),
            config_dir().join("toot_usercred.toml")
        );
    }

    #[test]
    fn test_read_secret_strips_invisible_chars() {
        let mut input = "\u{feff}ghp_abc\u{200b}\r\n".as_bytes();
        assert_eq!(read_secret(&mut input, "token").unwrap(), "ghp_abc");
    }

    #[test]
    fn test_read_secret_rejects_blank_answers() {
        let mut input = "  \r\n".as_bytes();
        assert!(read_secret(&mut input, "token").is_err());
        let mut input = "\u{feff}\n".as_bytes();
        let err = read_secret(&mut input, "token").unwrap_err();
        assert!(err.to_string().contains("token cannot be empty"));
    }

    #[test]
    fn test_read_answer_keeps_text() {
        let mut input = "  abc def \n".as_bytes();
        assert_eq!(read_answer(&mut input, "code").unwrap(), "abc def");
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("\u{feff}abc\r\n"), "abc");
        assert_eq!(sanitize_key("  k\u{200b}ey "), "key");
    }
}
