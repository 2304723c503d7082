//! Command-line flags as a configuration source.
//!
//! Flags follow the usual conventions:
//! - `--key=value` and `--key value` set a value
//! - `--key` on its own (or followed by another flag) sets `true`
//! - `--no-key` sets `false`
//! - `-abc` sets `a`, `b` and `c` to `true`; the last letter may take a value
//! - `--` ends flag parsing
//!
//! Positional arguments are discarded. A flag given several times collects its
//! values into a sequence. Malformed input is never an error.

use super::coerce::{coerce, coerce_value};
use super::keys::normalize;
use super::path::{RawEntry, build};
use super::sealed::Config;
use super::types::{ConfigValue, Mapping};
use tracing::debug;

/// A list of command-line arguments, without the program name.
#[derive(Debug, Clone, Default)]
pub struct ArgvSource {
    args: Vec<String>,
}

impl ArgvSource {
    /// Snapshot the process arguments, skipping the program name.
    ///
    /// Arguments that are not valid UTF-8 are converted lossily.
    pub fn from_process() -> Self {
        Self {
            args: std::env::args_os()
                .skip(1)
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
        }
    }

    pub fn from_args<S: Into<String>>(args: impl IntoIterator<Item = S>) -> Self {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Parse the flags into normalized keys and coerced values, in order of
    /// first appearance.
    pub fn parse(&self) -> Vec<(String, ConfigValue)> {
        let mut parsed = ParsedFlags::default();
        let mut iter = self.args.iter().peekable();

        while let Some(arg) = iter.next() {
            if arg == "--" {
                parsed.positional += iter.by_ref().count();
                break;
            }

            if let Some(body) = arg.strip_prefix("--") {
                if let Some((key, value)) = body.split_once('=') {
                    parsed.set(key, ConfigValue::String(value.to_string()));
                } else if let Some(key) = body.strip_prefix("no-") {
                    parsed.set(key, ConfigValue::Bool(false));
                } else if let Some(value) = iter.next_if(|next| !is_flag(next)) {
                    parsed.set(body, ConfigValue::String(value.clone()));
                } else {
                    parsed.set(body, ConfigValue::Bool(true));
                }
            } else if is_flag(arg) {
                let cluster = &arg[1..];
                let (letters, inline) = match cluster.split_once('=') {
                    Some((letters, value)) => (letters, Some(value)),
                    None => (cluster, None),
                };

                let Some(first) = letters.chars().next() else {
                    continue;
                };
                let rest = &letters[first.len_utf8()..];
                // `-n5`: a single letter directly followed by a number.
                if inline.is_none() && is_number(rest) {
                    parsed.set(&first.to_string(), ConfigValue::String(rest.to_string()));
                    continue;
                }

                // Every letter but the last is a switch; the last takes the value.
                let mut switches: Vec<char> = letters.chars().collect();
                let Some(last) = switches.pop() else {
                    continue;
                };
                for letter in switches {
                    parsed.set(&letter.to_string(), ConfigValue::Bool(true));
                }
                let value = match inline {
                    Some(value) => ConfigValue::String(value.to_string()),
                    None => match iter.next_if(|next| !is_flag(next)) {
                        Some(value) => ConfigValue::String(value.clone()),
                        None => ConfigValue::Bool(true),
                    },
                };
                parsed.set(&last.to_string(), value);
            } else {
                parsed.positional += 1;
            }
        }

        if parsed.positional > 0 {
            debug!(count = parsed.positional, "Ignoring positional arguments");
        }
        parsed
            .flags
            .into_iter()
            .map(|(key, value)| (key, coerce_value(value)))
            .collect()
    }

    /// Build the nested tree. Flags are never prefix-filtered.
    pub fn load(&self) -> Mapping {
        let flags = self.parse();
        debug!(flags = flags.len(), "Loaded command-line flags");
        build(
            flags
                .into_iter()
                .map(|(key, value)| RawEntry::new(&key, value)),
        )
    }

    /// Load the flags on their own, sealing the result when `freeze` is set.
    pub fn load_config(&self, freeze: bool) -> Config {
        let config = Config::new(self.load());
        if freeze { config.seal() } else { config }
    }
}

#[derive(Default)]
struct ParsedFlags {
    flags: Vec<(String, ConfigValue)>,
    positional: usize,
}

impl ParsedFlags {
    fn set(&mut self, raw_key: &str, value: ConfigValue) {
        let Some(key) = normalize(raw_key, None) else {
            return;
        };
        match self.flags.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, ConfigValue::Sequence(values))) => values.push(value),
            Some((_, previous)) => {
                let first = std::mem::replace(previous, ConfigValue::Null);
                *previous = ConfigValue::Sequence(vec![first, value]);
            }
            None => self.flags.push((key, value)),
        }
    }
}

/// A token starting with `-` that is not a negative number.
fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && !is_number(token)
}

fn is_number(token: &str) -> bool {
    matches!(coerce(token), ConfigValue::Number(_))
}
