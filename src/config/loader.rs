//! Configuration loader with source precedence.
//!
//! Loads the environment, JSON files and command-line flags and merges them
//! key-by-key. Later sources override earlier ones.

use super::argv::ArgvSource;
use super::env::EnvSource;
use super::files::{
    DEFAULT_ENVIRONMENT, default_base_dir, environment_files, read_tree, resolve_path,
};
use super::merge::deep_merge;
use super::sealed::Config;
use super::types::Mapping;
use crate::error::ConfigResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Variable selecting the environment-named config file.
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

/// Checked when [`ENVIRONMENT_VAR`] is unset and no other variable is configured.
pub const FALLBACK_ENVIRONMENT_VAR: &str = "NODE_ENV";

/// Source priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Environment variables (lowest priority)
    Environment = 0,
    /// JSON files, in the order given
    File = 1,
    /// Command-line flags (highest priority)
    Argv = 2,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Environment => write!(f, "environment"),
            ConfigTier::File => write!(f, "file"),
            ConfigTier::Argv => write!(f, "argv"),
        }
    }
}

/// Options recognized by every load entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Seal the result so it can no longer be modified.
    #[serde(default = "default_freeze")]
    pub freeze: bool,

    /// Keep only environment keys starting with this prefix, stripped before
    /// nesting. Command-line flags are never filtered.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Directory to search for `<environment>.json`.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Directories to search for `<environment>.json`, in order. Takes
    /// precedence over `dir`.
    #[serde(default)]
    pub dirs: Option<Vec<PathBuf>>,

    /// Explicit environment name, overriding the environment variable.
    #[serde(default)]
    pub environment: Option<String>,

    /// Variable holding the environment name.
    #[serde(default = "default_env_var")]
    pub env_var: String,
}

fn default_freeze() -> bool {
    true
}

fn default_env_var() -> String {
    ENVIRONMENT_VAR.to_string()
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            freeze: default_freeze(),
            prefix: None,
            dir: None,
            dirs: None,
            environment: None,
            env_var: default_env_var(),
        }
    }
}

impl LoadOptions {
    pub fn with_freeze(mut self, freeze: bool) -> Self {
        self.freeze = freeze;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn with_dirs<P: Into<PathBuf>>(mut self, dirs: impl IntoIterator<Item = P>) -> Self {
        self.dirs = Some(dirs.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Directories to search for the environment-named file.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        match (&self.dirs, &self.dir) {
            (Some(dirs), dir) => {
                if dir.is_some() {
                    warn!("Both 'dir' and 'dirs' are set; ignoring 'dir'");
                }
                dirs.clone()
            }
            (None, Some(dir)) => vec![dir.clone()],
            (None, None) => Vec::new(),
        }
    }

    /// The environment name used for file lookup.
    ///
    /// An explicit name wins, then the configured variable, then `NODE_ENV`
    /// when the default variable is in use. Empty values count as unset.
    pub fn environment_name(&self, env: &EnvSource) -> String {
        let non_empty = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(String::from);

        non_empty(self.environment.as_deref())
            .or_else(|| non_empty(env.var(&self.env_var)))
            .or_else(|| {
                if self.env_var == ENVIRONMENT_VAR {
                    non_empty(env.var(FALLBACK_ENVIRONMENT_VAR))
                } else {
                    None
                }
            })
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }
}

/// Loads and merges configuration sources.
///
/// Sources default to the process environment and arguments; tests and
/// embedders can substitute snapshots with [`ConfigLoader::env`] and
/// [`ConfigLoader::argv`].
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    options: LoadOptions,
    files: Vec<PathBuf>,
    base_dir: Option<PathBuf>,
    env: Option<EnvSource>,
    argv: Option<ArgvSource>,
}

impl ConfigLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Add a configuration file. Files merge in the order they are added.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn files<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.files.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Directory relative file names resolve against (default: working directory).
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Use an environment snapshot instead of the process environment.
    pub fn env(mut self, env: EnvSource) -> Self {
        self.env = Some(env);
        self
    }

    /// Use an argument list instead of the process arguments.
    pub fn argv(mut self, argv: ArgvSource) -> Self {
        self.argv = Some(argv);
        self
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load all sources and merge them: environment, then files in order,
    /// then command-line flags.
    ///
    /// Files are read concurrently. If any file fails to read or parse the
    /// whole load fails and nothing is returned.
    pub async fn load(&self) -> ConfigResult<Config> {
        let env = self.env.clone().unwrap_or_else(EnvSource::from_process);
        let argv = self.argv.clone().unwrap_or_else(ArgvSource::from_process);
        let base_dir = self.base_dir.clone().unwrap_or_else(default_base_dir);

        let mut merged = env.load(self.options.prefix.as_deref());
        debug!(tier = %ConfigTier::Environment, keys = merged.len(), "Merged source");

        let paths = self.resolve_files(&base_dir, &env).await?;
        let trees = read_all(paths.clone()).await?;
        for (path, tree) in paths.iter().zip(trees) {
            debug!(tier = %ConfigTier::File, path = %path.display(), "Merged source");
            deep_merge(&mut merged, tree);
        }

        let flags = argv.load();
        debug!(tier = %ConfigTier::Argv, keys = flags.len(), "Merged source");
        deep_merge(&mut merged, flags);

        let config = Config::new(merged);
        info!(
            keys = config.root().len(),
            sealed = self.options.freeze,
            "Configuration loaded"
        );
        Ok(if self.options.freeze {
            config.seal()
        } else {
            config
        })
    }

    /// Like [`load`](Self::load), also handing the result to `callback`.
    ///
    /// The callback runs exactly once, before the same result is returned.
    pub async fn load_with_callback<F>(&self, callback: F) -> ConfigResult<Config>
    where
        F: FnOnce(&ConfigResult<Config>),
    {
        let result = self.load().await;
        callback(&result);
        result
    }

    /// Explicit files followed by environment-named files that exist.
    async fn resolve_files(&self, base_dir: &Path, env: &EnvSource) -> ConfigResult<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = self
            .files
            .iter()
            .map(|file| resolve_path(base_dir, file))
            .collect();

        let dirs = self.options.search_dirs();
        if !dirs.is_empty() {
            let environment = self.options.environment_name(env);
            let found = environment_files(base_dir, &dirs, &environment).await?;
            debug!(
                environment = %environment,
                searched = dirs.len(),
                found = found.len(),
                "Searched for environment config files"
            );
            paths.extend(found);
        }
        Ok(paths)
    }
}

/// Read every file concurrently and return the trees in input order.
async fn read_all(paths: Vec<PathBuf>) -> ConfigResult<Vec<Mapping>> {
    let reads: Vec<_> = paths
        .into_iter()
        .map(|path| tokio::spawn(async move { read_tree(&path).await }))
        .collect();

    let mut trees = Vec::with_capacity(reads.len());
    for read in reads {
        trees.push(read.await??);
    }
    Ok(trees)
}

/// Load the given files on top of the process environment, with the process
/// arguments applied last.
pub async fn load<P: Into<PathBuf>>(
    files: impl IntoIterator<Item = P>,
    options: LoadOptions,
) -> ConfigResult<Config> {
    ConfigLoader::new(options).files(files).load().await
}
