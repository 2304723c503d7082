//! Configuration tree types.
//!
//! A loaded configuration is a tree of [`ConfigValue`]s rooted at a [`Mapping`].
//! Mappings carry an explicit self value slot for the value that lives directly
//! at a path which also has deeper children (`a=x` next to `a_b=y`). The slot is
//! rendered as the `"_"` key when serialized and read back from `"_"` when
//! parsed.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Key used for the self value slot in serialized output.
pub const SELF_KEY: &str = "_";

/// A single configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Opaque leaf: sequences are replaced wholesale, never merged element-wise.
    Sequence(Vec<ConfigValue>),
    Mapping(Mapping),
}

impl ConfigValue {
    pub fn is_mapping(&self) -> bool {
        matches!(self, ConfigValue::Mapping(_))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// The value stored directly at this path.
    ///
    /// For leaves this is the value itself; for mappings it is the self value
    /// slot, if one was set.
    pub fn own_value(&self) -> Option<&ConfigValue> {
        match self {
            ConfigValue::Mapping(map) => map.own_value(),
            leaf => Some(leaf),
        }
    }

    /// Turn this value into a mapping in place and return it.
    ///
    /// A leaf occupying the position is kept as the new mapping's self value.
    pub fn promote(&mut self) -> &mut Mapping {
        if !self.is_mapping() {
            let leaf = std::mem::replace(self, ConfigValue::Null);
            *self = ConfigValue::Mapping(Mapping::with_own(leaf));
        }
        match self {
            ConfigValue::Mapping(map) => map,
            _ => unreachable!("value was promoted to a mapping"),
        }
    }

    /// Convert to a plain JSON value, rendering self slots as `"_"`.
    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Null => Value::Null,
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Number(n) => Value::Number(n.clone()),
            ConfigValue::String(s) => Value::String(s.clone()),
            ConfigValue::Sequence(items) => {
                Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            ConfigValue::Mapping(map) => map.to_json(),
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => ConfigValue::Number(n),
            Value::String(s) => ConfigValue::String(s),
            Value::Array(items) => {
                ConfigValue::Sequence(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Object(object) => ConfigValue::Mapping(Mapping::from(object)),
        }
    }
}

impl From<Mapping> for ConfigValue {
    fn from(map: Mapping) -> Self {
        ConfigValue::Mapping(map)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Number(n.into())
    }
}

impl From<i32> for ConfigValue {
    fn from(n: i32) -> Self {
        ConfigValue::Number(n.into())
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Number(n) => n.serialize(serializer),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Sequence(items) => items.serialize(serializer),
            ConfigValue::Mapping(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ConfigValue::from)
    }
}

/// A nested configuration mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    own: Option<Box<ConfigValue>>,
    entries: BTreeMap<String, ConfigValue>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapping whose self value slot holds `value`.
    pub fn with_own(value: ConfigValue) -> Self {
        Self {
            own: Some(Box::new(value)),
            entries: BTreeMap::new(),
        }
    }

    pub fn own_value(&self) -> Option<&ConfigValue> {
        self.own.as_deref()
    }

    pub fn set_own(&mut self, value: ConfigValue) {
        self.own = Some(Box::new(value));
    }

    pub fn take_own(&mut self) -> Option<ConfigValue> {
        self.own.take().map(|boxed| *boxed)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert an entry, returning the previous value at that key.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.remove(key)
    }

    /// Store a value at `key` without discarding deeper entries.
    ///
    /// When a mapping already lives at `key` the value becomes that mapping's
    /// self value; otherwise the value is inserted or overwritten.
    pub fn assign(&mut self, key: impl Into<String>, value: ConfigValue) {
        let key = key.into();
        match self.entries.get_mut(&key) {
            Some(ConfigValue::Mapping(existing)) => existing.set_own(value),
            Some(existing) => *existing = value,
            None => {
                self.entries.insert(key, value);
            }
        }
    }

    /// Get the child mapping at `key`, creating or promoting it as needed.
    pub fn child_mut(&mut self, key: &str) -> &mut Mapping {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| ConfigValue::Mapping(Mapping::new()))
            .promote()
    }

    /// Look up a dotted path such as `redis.auth`.
    pub fn lookup(&self, path: &str) -> Option<&ConfigValue> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_mapping()?.get(segment)?;
        }
        Some(current)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries and no self value.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.own.is_none()
    }

    pub fn to_json(&self) -> Value {
        let mut object = serde_json::Map::new();
        if let Some(own) = self.own_value() {
            object.insert(SELF_KEY.to_string(), own.to_json());
        }
        for (key, value) in &self.entries {
            object.insert(key.clone(), value.to_json());
        }
        Value::Object(object)
    }
}

impl From<serde_json::Map<String, Value>> for Mapping {
    fn from(object: serde_json::Map<String, Value>) -> Self {
        let mut map = Mapping::new();
        for (key, value) in object {
            if key == SELF_KEY {
                map.set_own(value.into());
            } else {
                map.entries.insert(key, value.into());
            }
        }
        map
    }
}

/// Iterates the entries; the self value is not included.
impl IntoIterator for Mapping {
    type Item = (String, ConfigValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.entries.len() + usize::from(self.own.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(own) = self.own_value() {
            map.serialize_entry(SELF_KEY, own)?;
        }
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Map::<String, Value>::deserialize(deserializer).map(Mapping::from)
    }
}
