//! Logging set-up for the command-line tool.
//!
//! Output goes to stdout, stderr or a file through a `tracing` fmt
//! subscriber. `RUST_LOG` overrides the level chosen by `--verbose`.

use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Where log output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    /// Append to a file.
    File(PathBuf),
}

impl FromStr for LogTarget {
    type Err = std::convert::Infallible;

    /// Accepts `0`/`off`, `1`/`stdout`, `2`/`stderr`, or a file name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            filename => LogTarget::File(PathBuf::from(filename)),
        })
    }
}

/// Install the global subscriber.
pub fn init(target: &LogTarget, verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    match target {
        LogTarget::Off => Ok(()),
        LogTarget::Stdout => install(level, std::io::stdout, true),
        LogTarget::Stderr => install(level, std::io::stderr, true),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            install(level, Mutex::new(file), false)
        }
    }
}

fn install<W>(level: Level, writer: W, ansi: bool) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = FmtSubscriber::builder().with_writer(writer).with_ansi(ansi);
    match EnvFilter::try_from_default_env() {
        Ok(filter) => {
            let subscriber = builder.with_env_filter(filter).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        Err(_) => {
            let subscriber = builder.with_max_level(level).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}
