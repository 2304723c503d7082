//! Building nested mappings from flat `_`-delimited keys.
//!
//! Collisions between a short key and a longer key sharing its prefix are
//! resolved by keeping the short key's value in the mapping's self value slot:
//! `a=x` and `a_b=y` produce `{ a: { _: "x", b: "y" } }` in either order.

use super::coerce::coerce;
use super::keys::{normalize, segments};
use super::types::{ConfigValue, Mapping};

/// A normalized key split into path segments, paired with its value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub segments: Vec<String>,
    pub value: ConfigValue,
}

impl RawEntry {
    pub fn new(normalized: &str, value: ConfigValue) -> Self {
        Self {
            segments: segments(normalized).into_iter().map(String::from).collect(),
            value,
        }
    }
}

/// Insert one value at the path described by `segments`.
///
/// Empty segments are skipped except the last one, which becomes an
/// empty-string key. The last write to an exact path wins.
pub fn insert<S: AsRef<str>>(root: &mut Mapping, segments: &[S], value: ConfigValue) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut level = root;
    for segment in parents {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        level = level.child_mut(segment);
    }

    level.assign(last.as_ref(), value);
}

/// Build a mapping from entries applied in order.
pub fn build(entries: impl IntoIterator<Item = RawEntry>) -> Mapping {
    let mut root = Mapping::new();
    for entry in entries {
        insert(&mut root, &entry.segments, entry.value);
    }
    root
}

/// Normalize, coerce and nest flat string pairs in their given order.
///
/// Keys rejected by the prefix filter are dropped.
pub fn from_flat<K, V>(pairs: impl IntoIterator<Item = (K, V)>, prefix: Option<&str>) -> Mapping
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    build(pairs.into_iter().filter_map(|(key, value)| {
        let normalized = normalize(key.as_ref(), prefix)?;
        Some(RawEntry::new(&normalized, coerce(value.as_ref())))
    }))
}
