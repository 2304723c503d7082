//! JSON configuration files.
//!
//! File names without an extension get `.json` appended, and relative names
//! resolve against a base directory (the process working directory unless the
//! caller supplies one). Environment-named files (`<dir>/<env>.json`) are
//! looked up in every configured directory; missing ones are skipped.

use super::sealed::Config;
use super::types::{ConfigValue, Mapping};
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment name used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Resolve a configuration file name to an absolute path.
pub fn resolve_path(base_dir: &Path, name: impl AsRef<Path>) -> PathBuf {
    let name = name.as_ref();
    let name = if name.extension().is_some() {
        name.to_path_buf()
    } else {
        let mut with_ext = name.as_os_str().to_owned();
        with_ext.push(".json");
        PathBuf::from(with_ext)
    };
    absolute(&base_dir.join(name))
}

/// The directory relative file names resolve against by default.
pub fn default_base_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Parse JSON text into a configuration tree.
///
/// `path` is only used for error reporting.
pub fn parse(text: &str, path: &Path) -> ConfigResult<Mapping> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    match ConfigValue::from(value) {
        ConfigValue::Mapping(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Read and parse one JSON file into an unsealed tree.
///
/// `path` should already be resolved; see [`resolve_path`].
pub async fn read_tree(path: &Path) -> ConfigResult<Mapping> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let tree = parse(&text, path)?;
    debug!(path = %path.display(), keys = tree.len(), "Loaded config file");
    Ok(tree)
}

/// Load a single configuration file, sealing it when `freeze` is set.
///
/// The name is resolved against `base_dir` with [`resolve_path`].
pub async fn load_file(
    base_dir: &Path,
    name: impl AsRef<Path>,
    freeze: bool,
) -> ConfigResult<Config> {
    let path = resolve_path(base_dir, name);
    let config = Config::new(read_tree(&path).await?);
    Ok(if freeze { config.seal() } else { config })
}

/// Find `<dir>/<environment>.json` in each directory.
///
/// Existence checks run concurrently; the files that exist are returned in
/// directory order.
pub async fn environment_files(
    base_dir: &Path,
    dirs: &[PathBuf],
    environment: &str,
) -> ConfigResult<Vec<PathBuf>> {
    let file_name = format!("{environment}.json");
    let checks: Vec<_> = dirs
        .iter()
        .map(|dir| {
            let candidate = absolute(&base_dir.join(dir).join(&file_name));
            tokio::spawn(async move {
                let exists = tokio::fs::try_exists(&candidate).await.unwrap_or(false);
                (candidate, exists)
            })
        })
        .collect();

    let mut found = Vec::new();
    for check in checks {
        let (candidate, exists) = check.await?;
        if exists {
            found.push(candidate);
        } else {
            debug!(path = %candidate.display(), "No environment config file");
        }
    }
    Ok(found)
}
