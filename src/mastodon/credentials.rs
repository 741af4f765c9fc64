//! OAuth credentials persisted between runs as small TOML files.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Written once when the app is registered with the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub api_base: String,
    pub app_name: String,
}

/// Written once after the user authorizes the app; read on every post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    pub access_token: String,
    pub api_base: String,
}

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse credentials: {}", path.display()))
}

/// Write credentials readable by the owner only.
pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string(value).context("Failed to serialize credentials")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    restrict_permissions(path)?;
    tracing::debug!(path = %path.display(), "saved credentials");
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
