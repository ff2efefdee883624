//! Decode a raw form submission into a typed override tree.
//!
//! Browsers post every checkbox as strings: a hidden `"false"` input followed
//! by the checkbox itself (`"true"`) when checked. The font-size toggle posts
//! the empty-sequence marker `"[]"` when unchecked and a bare `"on"` when
//! checked. Decoding is fail-closed: any value that is not exactly `"true"`
//! decodes to `false`, and nothing is ever rejected.

use serde_json::Value;

use crate::types::{
    ConfigTree, ConfigValue, EMPTY_SEQUENCE_SENTINEL, FONT_FAMILIES_KEY, FONT_SIZES_KEY,
    OverrideRecord, is_excluded,
};

/// Transport fields posted alongside the settings. Never decoded.
pub const HOUSEKEEPING_FIELDS: [&str; 3] = ["_wp_http_referer", "submit", "reset"];

/// Knobs the decoder needs from the manager options.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOptions {
    /// Origin under `typography.fontSizes` restored when the toggle is enabled.
    pub font_size_origin: String,
    /// Name of the CSRF token field, stripped like the other housekeeping fields.
    pub nonce_field: String,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            font_size_origin: "theme".into(),
            nonce_field: "theme-json-manager-nonce".into(),
        }
    }
}

/// Raw `(name, value)` pairs in the order the transport delivered them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    pairs: Vec<(String, String)>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        let mut s = Self::new();
        for (n, v) in pairs {
            s.push(n, v);
        }
        s
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Whether a field with this exact name (ignoring surrounding whitespace) was posted.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Last value posted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(n, _)| n.trim() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parse an `application/x-www-form-urlencoded` body.
    #[cfg(feature = "form")]
    pub fn from_urlencoded(body: &str) -> Self {
        let mut s = Self::new();
        for part in body.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = part.split_once('=').unwrap_or((part, ""));
            s.push(form_decode(name), form_decode(value));
        }
        s
    }
}

#[cfg(feature = "form")]
fn form_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_encoding::percent_decode_str(&spaced)
        .decode_utf8_lossy()
        .into_owned()
}

/// A posted field name: `key` or `key[nested]`. `Deep` is anything nested
/// further (`a[b][c]`), which still addresses `a.b` but never decodes true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldName<'a> {
    Top(&'a str),
    Nested(&'a str, &'a str),
    Deep(&'a str, &'a str),
}

fn parse_name(raw: &str) -> FieldName<'_> {
    let name = raw.trim();
    if let Some(open) = name.find('[')
        && open > 0
        && let Some(close) = name[open..].find(']')
    {
        let inner = &name[open + 1..open + close];
        if !inner.contains('[') {
            let (top, rest) = (&name[..open], &name[open + close + 1..]);
            return if rest.is_empty() {
                FieldName::Nested(top, inner)
            } else {
                FieldName::Deep(top, inner)
            };
        }
    }
    FieldName::Top(name)
}

/// Posted values after last-wins collapsing, keyed like the final tree.
enum Posted<'a> {
    Scalar(&'a str),
    Nested(Vec<(&'a str, &'a str)>),
}

fn collapse<'a>(submission: &'a Submission, options: &DecodeOptions) -> Vec<(&'a str, Posted<'a>)> {
    let mut out: Vec<(&str, Posted)> = Vec::new();
    for (raw_name, value) in submission.iter() {
        let name = parse_name(raw_name);
        let top = match name {
            FieldName::Top(k) | FieldName::Nested(k, _) | FieldName::Deep(k, _) => k,
        };
        if HOUSEKEEPING_FIELDS.contains(&top) || top == options.nonce_field || is_excluded(top) {
            continue;
        }
        let i = match out.iter().position(|(k, _)| *k == top) {
            Some(i) => i,
            None => {
                out.push((top, Posted::Nested(Vec::new())));
                out.len() - 1
            }
        };
        let slot = &mut out[i].1;
        let (nested_key, value) = match name {
            FieldName::Top(_) => {
                *slot = Posted::Scalar(value);
                continue;
            }
            FieldName::Nested(_, nested_key) => (nested_key, value),
            // An array never equals "true".
            FieldName::Deep(_, nested_key) => (nested_key, "false"),
        };
        if let Posted::Scalar(_) = slot {
            *slot = Posted::Nested(Vec::new());
        }
        if let Posted::Nested(entries) = slot {
            match entries.iter_mut().find(|(k, _)| *k == nested_key) {
                Some(entry) => entry.1 = value,
                None => entries.push((nested_key, value)),
            }
        }
    }
    out
}

/// Decode `submission` into an override tree.
///
/// `base` is the live global settings, consulted only to restore font-size
/// presets when the toggle is enabled: the form itself carries no size data.
pub fn decode(submission: &Submission, base: &ConfigTree, options: &DecodeOptions) -> ConfigTree {
    let mut settings = ConfigTree::new();
    for (key, posted) in collapse(submission, options) {
        match posted {
            Posted::Scalar(value) => {
                settings.insert(key, decode_bool(value));
            }
            Posted::Nested(entries) => {
                let mut nested = ConfigTree::new();
                for (nested_key, value) in entries {
                    if let Some(decoded) = decode_nested(nested_key, value, base, options) {
                        nested.insert(nested_key, decoded);
                    }
                }
                if !nested.is_empty() {
                    settings.insert(key, nested);
                }
            }
        }
    }
    settings
}

/// Decode and wrap into a versioned record, ready for the store.
pub fn build_record(
    submission: &Submission,
    base: &ConfigTree,
    options: &DecodeOptions,
) -> OverrideRecord {
    OverrideRecord::new(decode(submission, base, options))
}

/// `"true"` is the only truthy spelling.
pub fn decode_bool(value: &str) -> bool {
    value == "true"
}

fn decode_nested(
    nested_key: &str,
    value: &str,
    base: &ConfigTree,
    options: &DecodeOptions,
) -> Option<ConfigValue> {
    match nested_key {
        FONT_SIZES_KEY if value == EMPTY_SEQUENCE_SENTINEL => Some(ConfigValue::Sequence(Vec::new())),
        FONT_SIZES_KEY => Some(ConfigValue::Sequence(restore_font_sizes(base, options))),
        // Families can be switched off but there is no path to restore them.
        FONT_FAMILIES_KEY if value == "false" => Some(ConfigValue::Sequence(Vec::new())),
        FONT_FAMILIES_KEY => None,
        _ => Some(ConfigValue::Bool(decode_bool(value))),
    }
}

/// Presets live under `typography.fontSizes.<origin>` in merged global
/// settings, but a bare `theme.json` stores them as a flat list.
fn restore_font_sizes(base: &ConfigTree, options: &DecodeOptions) -> Vec<Value> {
    match base.path(&["typography", FONT_SIZES_KEY]) {
        Some(ConfigValue::Sequence(presets)) => return presets.clone(),
        Some(ConfigValue::Tree(origins)) => {
            if let Some(ConfigValue::Sequence(presets)) = origins.get(&options.font_size_origin) {
                return presets.clone();
            }
        }
        _ => {}
    }
    tracing::debug!(
        origin = %options.font_size_origin,
        "no font-size presets to restore, using an empty list"
    );
    Vec::new()
}
