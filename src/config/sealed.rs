//! The loaded configuration handle and its sealing.
//!
//! A [`Config`] owns its tree. Until it is sealed the tree can be changed
//! through [`Config::root_mut`], [`Config::insert`] and [`Config::merge`];
//! afterwards every mutation is rejected with [`ConfigError::Sealed`] and the
//! tree reads back unchanged. Sealing covers every nested mapping, including
//! mappings held inside sequences, because nothing inside the tree is
//! reachable mutably except through the handle.

use super::merge::deep_merge;
use super::path::insert;
use super::types::{ConfigValue, Mapping};
use crate::error::{ConfigError, ConfigResult};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// A loaded configuration tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    root: Arc<Mapping>,
    sealed: bool,
}

impl Config {
    /// Wrap an unsealed tree.
    pub fn new(root: Mapping) -> Self {
        Self {
            root: Arc::new(root),
            sealed: false,
        }
    }

    /// Make the configuration permanently immutable.
    ///
    /// Sealing an already sealed configuration is a no-op.
    pub fn seal(mut self) -> Self {
        self.sealed = true;
        self
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Mutable access to the tree, rejected once sealed.
    pub fn root_mut(&mut self) -> ConfigResult<&mut Mapping> {
        if self.sealed {
            return Err(ConfigError::Sealed);
        }
        Ok(Arc::make_mut(&mut self.root))
    }

    /// Insert a value at a path of segments.
    pub fn insert<S: AsRef<str>>(&mut self, segments: &[S], value: ConfigValue) -> ConfigResult<()> {
        insert(self.root_mut()?, segments, value);
        Ok(())
    }

    /// Deep merge another tree on top of this one.
    pub fn merge(&mut self, overlay: Mapping) -> ConfigResult<()> {
        deep_merge(self.root_mut()?, overlay);
        Ok(())
    }

    /// Look up a dotted path such as `redis.auth`.
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        self.root.lookup(path)
    }

    /// Deserialize the configuration into a typed value.
    pub fn extract<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.root.to_json()
    }

    /// Take the tree out of an unsealed handle.
    ///
    /// A sealed configuration stays sealed: unwrapping it is rejected like
    /// any other mutation. Use [`Config::root`] to read it.
    pub fn into_inner(self) -> ConfigResult<Mapping> {
        if self.sealed {
            return Err(ConfigError::Sealed);
        }
        Ok(Arc::unwrap_or_clone(self.root))
    }
}

impl From<Mapping> for Config {
    fn from(root: Mapping) -> Self {
        Self::new(root)
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}
