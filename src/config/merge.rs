//! Deep merge of configuration trees.
//!
//! Implements key-by-key merging where later sources override earlier ones.
//! Sequences are replaced entirely, not concatenated.

use super::types::{ConfigValue, Mapping};

/// Deep merge `overlay` into `base`, with `overlay` taking precedence.
///
/// - Mappings are merged recursively: keys in overlay override keys in base
/// - Sequences, strings, numbers, booleans and nulls replace the base value
/// - A leaf meeting a mapping never discards the mapping's deeper keys: the
///   leaf lands in the mapping's self value slot, the same way flat keys
///   collide in [`insert`](super::path::insert)
///
/// # Example
/// ```
/// use serde_json::json;
/// use strataconf::config::{Mapping, deep_merge};
///
/// let mut base: Mapping = serde_json::from_value(json!({
///     "server": { "port": 8080, "host": "localhost" },
///     "features": ["a", "b"]
/// })).unwrap();
/// let overlay: Mapping = serde_json::from_value(json!({
///     "server": { "port": 9000 },
///     "features": ["c"]
/// })).unwrap();
/// deep_merge(&mut base, overlay);
/// assert_eq!(
///     base.to_json(),
///     json!({ "server": { "port": 9000, "host": "localhost" }, "features": ["c"] })
/// );
/// ```
pub fn deep_merge(base: &mut Mapping, mut overlay: Mapping) {
    if let Some(own) = overlay.take_own() {
        base.set_own(own);
    }

    for (key, overlay_value) in overlay {
        match overlay_value {
            ConfigValue::Mapping(nested) => deep_merge(base.child_mut(&key), nested),
            leaf => base.assign(key, leaf),
        }
    }
}

/// Merge multiple trees in order, with later trees taking precedence.
///
/// Equivalent to folding `deep_merge` over the list.
pub fn deep_merge_all(trees: impl IntoIterator<Item = Mapping>) -> Mapping {
    trees.into_iter().fold(Mapping::new(), |mut acc, tree| {
        deep_merge(&mut acc, tree);
        acc
    })
}
