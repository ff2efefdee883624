//! The value model shared by the flattener, decoder, and merge engine.
//!
//! A theme settings document is JSON without a schema. Instead of probing
//! `serde_json::Value` at every step, documents are lifted once into
//! [`ConfigValue`], a tagged union with exactly the four shapes the engine
//! cares about, and every transformation is a pattern match over it.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Top-level keys that are never flattened, decoded, or overridden.
pub const EXCLUDED_KEYS: [&str; 3] = ["blocks", "layout", "appearanceTools"];

/// Schema version written into every override record.
pub const RECORD_VERSION: u32 = 2;

/// Submitted value that marks an array-valued toggle as disabled.
pub const EMPTY_SEQUENCE_SENTINEL: &str = "[]";

/// Nested key edited through a single [`FieldKind::FontSizesToggle`].
pub const FONT_SIZES_KEY: &str = "fontSizes";

/// Nested key whose only editable state is "disabled".
pub const FONT_FAMILIES_KEY: &str = "fontFamilies";

pub fn is_excluded(key: &str) -> bool {
    EXCLUDED_KEYS.contains(&key)
}

/// A single value in a settings tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ConfigValue {
    Bool(bool),
    Tree(ConfigTree),
    /// Any JSON array, e.g. a list of font-size presets.
    Sequence(Vec<Value>),
    /// Strings, numbers and nulls. Carried through untouched.
    Opaque(Value),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            ConfigValue::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            ConfigValue::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Short shape name, used in log output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Tree(_) => "tree",
            ConfigValue::Sequence(_) => "sequence",
            ConfigValue::Opaque(_) => "opaque",
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Object(map) => ConfigValue::Tree(ConfigTree::from(map)),
            Value::Array(items) => ConfigValue::Sequence(items),
            other => ConfigValue::Opaque(other),
        }
    }
}

impl From<ConfigValue> for Value {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Bool(b) => Value::Bool(b),
            ConfigValue::Tree(tree) => Value::Object(tree.into()),
            ConfigValue::Sequence(items) => Value::Array(items),
            ConfigValue::Opaque(v) => v,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<ConfigTree> for ConfigValue {
    fn from(tree: ConfigTree) -> Self {
        ConfigValue::Tree(tree)
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Tree(tree) => tree.serialize(serializer),
            ConfigValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Opaque(v) => v.serialize(serializer),
        }
    }
}

/// An insertion-ordered mapping from key to [`ConfigValue`].
///
/// Order matters: the flattener emits fields in the order the theme declares
/// them. Replacing an existing key keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ConfigTree {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        let i = self.position(key)?;
        Some(&mut self.entries[i].1)
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        let i = self.position(key)?;
        Some(self.entries.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a value by key path, e.g. `["typography", "fontSizes", "theme"]`.
    pub fn path(&self, segments: &[&str]) -> Option<&ConfigValue> {
        let (first, rest) = segments.split_first()?;
        let value = self.get(first)?;
        if rest.is_empty() {
            return Some(value);
        }
        value.as_tree()?.path(rest)
    }

    /// The subtree under `key`, created (or replacing a non-tree value) as needed.
    pub fn subtree_mut(&mut self, key: &str) -> &mut ConfigTree {
        let i = match self.position(key) {
            Some(i) => {
                if !matches!(self.entries[i].1, ConfigValue::Tree(_)) {
                    self.entries[i].1 = ConfigValue::Tree(ConfigTree::new());
                }
                i
            }
            None => {
                self.entries
                    .push((key.to_string(), ConfigValue::Tree(ConfigTree::new())));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[i].1 {
            ConfigValue::Tree(tree) => tree,
            _ => unreachable!("entry was just set to a tree"),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl From<Map<String, Value>> for ConfigTree {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<ConfigTree> for Map<String, Value> {
    fn from(tree: ConfigTree) -> Self {
        tree.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigTree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = ConfigTree::new();
        for (k, v) in iter {
            tree.insert(k, v);
        }
        tree
    }
}

impl IntoIterator for ConfigTree {
    type Item = (String, ConfigValue);
    type IntoIter = std::vec::IntoIter<(String, ConfigValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Where an editable field lives. Depth is exactly one or two.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Top(String),
    Nested(String, String),
}

impl FieldPath {
    pub fn top(&self) -> &str {
        match self {
            FieldPath::Top(k) | FieldPath::Nested(k, _) => k,
        }
    }

    /// Form field name: `key` or `key[nested]`.
    pub fn form_name(&self) -> String {
        match self {
            FieldPath::Top(k) => k.clone(),
            FieldPath::Nested(k, n) => format!("{k}[{n}]"),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Top(k) => write!(f, "{k}"),
            FieldPath::Nested(k, n) => write!(f, "{k}.{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A plain checkbox over a boolean setting.
    Boolean,
    /// One checkbox standing in for the whole font-size preset list.
    FontSizesToggle,
}

/// One checkbox on the override form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub path: FieldPath,
    pub kind: FieldKind,
    pub current_value: bool,
}

impl FieldDescriptor {
    /// The value a browser would submit for this field in its current state.
    ///
    /// Checked booleans post `"true"`, unchecked post their hidden `"false"`.
    /// A checked font-size toggle carries no value attribute, so it posts
    /// `"on"`; unchecked, its hidden input posts the empty-sequence marker.
    pub fn submitted_value(&self) -> &'static str {
        match (self.kind, self.current_value) {
            (FieldKind::Boolean, true) => "true",
            (FieldKind::Boolean, false) => "false",
            (FieldKind::FontSizesToggle, true) => "on",
            (FieldKind::FontSizesToggle, false) => EMPTY_SEQUENCE_SENTINEL,
        }
    }
}

/// The persisted unit: `{"version": 2, "settings": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub version: u32,
    #[serde(default)]
    pub settings: ConfigTree,
}

impl OverrideRecord {
    pub fn new(settings: ConfigTree) -> Self {
        Self {
            version: RECORD_VERSION,
            settings,
        }
    }
}
