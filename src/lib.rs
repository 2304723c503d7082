//! Layered configuration from environment variables, JSON files and
//! command-line flags.
//!
//! ```no_run
//! # async fn run() -> strataconf::error::ConfigResult<()> {
//! use strataconf::{LoadOptions, load};
//!
//! let config = load(["config/base"], LoadOptions::default().with_prefix("my_app")).await?;
//! let port = config.get("http.port").and_then(|v| v.as_i64());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ConfigLoader, ConfigValue, LoadOptions, Mapping, load};
pub use error::{ConfigError, ConfigResult};
