//! Layered configuration.
//!
//! Builds one configuration tree from three sources, lowest precedence first:
//! 1. **Environment** - process variables, optionally filtered by a prefix
//! 2. **Files** - JSON files in the order given, then `<dir>/<env>.json` for
//!    every searched directory that has one
//! 3. **Argv** - command-line flags
//!
//! ## Key normalization
//! Flat keys (`MY_APP_REDIS_AUTH`, `--redis.auth`) are lowercased, runs of `.`
//! and `_` collapse into `_`, and each `_` starts a new nesting level. When a
//! key is both a value and the prefix of deeper keys, the value is kept in the
//! mapping's self value slot, serialized as `"_"`.
//!
//! ## Merge strategy
//! Mappings merge key-by-key; sequences and scalars replace earlier values.

pub mod argv;
pub mod coerce;
pub mod env;
pub mod files;
pub mod keys;
pub mod loader;
pub mod merge;
pub mod path;
mod sealed;
mod types;

pub use argv::ArgvSource;
pub use env::EnvSource;
pub use files::{load_file, resolve_path};
pub use loader::{ConfigLoader, ConfigTier, LoadOptions, load};
pub use merge::{deep_merge, deep_merge_all};
pub use path::{RawEntry, from_flat, insert};
pub use sealed::Config;
pub use types::{ConfigValue, Mapping, SELF_KEY};
