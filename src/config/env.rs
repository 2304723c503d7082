//! Environment variables as a configuration source.

use super::path::from_flat;
use super::sealed::Config;
use super::types::Mapping;
use tracing::debug;

/// A snapshot of environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: Vec<(String, String)>,
}

impl EnvSource {
    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    debug!(key = ?key, "Skipping non UTF-8 environment variable");
                    None
                }
            })
            .collect();
        Self { vars }
    }

    /// Use an explicit set of variables instead of the process environment.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Look up a variable by its exact name.
    pub fn var(&self, name: &str) -> Option<&str> {
        // Later entries shadow earlier ones, matching load order.
        self.vars
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Build the nested tree, keeping only keys that match `prefix`.
    pub fn load(&self, prefix: Option<&str>) -> Mapping {
        let tree = from_flat(self.vars.iter().map(|(k, v)| (k, v)), prefix);
        debug!(
            vars = self.vars.len(),
            keys = tree.len(),
            prefix = prefix.unwrap_or(""),
            "Loaded environment"
        );
        tree
    }

    /// Load the environment on its own, sealing the result when `freeze` is set.
    pub fn load_config(&self, prefix: Option<&str>, freeze: bool) -> Config {
        let config = Config::new(self.load(prefix));
        if freeze { config.seal() } else { config }
    }
}
