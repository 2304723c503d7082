//! CLI definitions for strataconf
//!
//! This module defines the CLI structure using clap's derive macros.
//! Everything after `--` is treated as configuration flags, exactly as a
//! program using the library would see its own arguments.

use crate::config::{ArgvSource, LoadOptions};
use crate::logging::LogTarget;
use clap::Parser;
use std::path::PathBuf;

/// Merge environment variables, JSON files and flags into one configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON files to merge, lowest precedence first (`.json` is implied)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Keep only environment variables starting with this prefix
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Directory to search for `<environment>.json` (repeatable)
    #[arg(short, long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Directory relative file names resolve against (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Environment name for `<environment>.json` lookup
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Variable holding the environment name
    #[arg(long, default_value = crate::config::loader::ENVIRONMENT_VAR)]
    pub env_var: String,

    /// Ignore the process environment
    #[arg(long)]
    pub no_env: bool,

    /// Print only the value at this dotted path (e.g. `redis.auth`)
    #[arg(short, long, value_name = "PATH")]
    pub get: Option<String>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2")]
    pub log: LogTarget,

    /// Configuration flags, given after `--`
    #[arg(last = true, value_name = "FLAGS")]
    pub flags: Vec<String>,
}

impl Cli {
    /// Load options described by the command line.
    pub fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions {
            prefix: self.prefix.clone(),
            environment: self.environment.clone(),
            env_var: self.env_var.clone(),
            ..LoadOptions::default()
        };
        if !self.dirs.is_empty() {
            options.dirs = Some(self.dirs.clone());
        }
        options
    }

    pub fn argv(&self) -> ArgvSource {
        ArgvSource::from_args(self.flags.iter().cloned())
    }
}
