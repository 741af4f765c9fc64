pub mod s3;
pub mod sigv4;

use anyhow::Result;
use std::path::Path;

/// Object key for an upload: the file name of the local path.
pub fn default_key(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| anyhow::anyhow!("{} has no file name", path.display()))
}
