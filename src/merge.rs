//! Merge a stored override onto the base settings.
//!
//! The merge is depth-aware but only to two levels, matching what the form
//! can express: a top-level tree in the override merges key-by-key into the
//! base tree of the same name, and every other override value (booleans,
//! sequences, deeper trees) replaces the base value outright.

use serde_json::Value;

use crate::types::{ConfigTree, ConfigValue, OverrideRecord, is_excluded};

/// Produce the effective settings. No record means `base` unchanged.
pub fn merge(base: ConfigTree, record: Option<&OverrideRecord>) -> ConfigTree {
    match record {
        Some(r) => merge_settings(base, r.settings.clone()),
        None => base,
    }
}

/// Merge `overlay` on top of `base`.
/// If both sides have a tree for the same top-level key, nested keys are
/// replaced one by one. Otherwise `overlay`'s value wins, even when that
/// changes the value's shape.
pub fn merge_settings(mut base: ConfigTree, overlay: ConfigTree) -> ConfigTree {
    for (key, overlay_val) in overlay {
        if is_excluded(&key) {
            tracing::warn!(%key, "override carries an excluded key, ignoring it");
            continue;
        }
        match overlay_val {
            ConfigValue::Tree(overlay_tree)
                if matches!(base.get(&key), Some(ConfigValue::Tree(_))) =>
            {
                let base_tree = base.subtree_mut(&key);
                for (nested_key, nested_val) in overlay_tree {
                    base_tree.insert(nested_key, nested_val);
                }
            }
            overlay_val => {
                if let Some(existing) = base.get(&key)
                    && existing.kind_name() != overlay_val.kind_name()
                {
                    tracing::debug!(
                        %key,
                        base = existing.kind_name(),
                        overlay = overlay_val.kind_name(),
                        "override changes the shape of a setting"
                    );
                }
                base.insert(key, overlay_val);
            }
        }
    }
    base
}

/// Apply `record` to a whole theme document, e.g. a parsed `theme.json`.
///
/// Only the document's `settings` object is merged; `styles`, `templateParts`
/// and every other top-level key pass through untouched. This is the function
/// to register with the host's configuration-assembly pipeline.
pub fn apply_to_document(document: Value, record: Option<&OverrideRecord>) -> Value {
    let Some(record) = record else {
        return document;
    };
    let mut doc = match document {
        Value::Object(doc) => doc,
        other => {
            tracing::warn!("theme document is not an object, leaving it as is");
            return other;
        }
    };
    let slot = doc.entry("settings").or_insert_with(|| Value::Object(Default::default()));
    let base = match std::mem::take(slot) {
        Value::Object(settings) => ConfigTree::from(settings),
        other => {
            tracing::debug!(found = ?other, "document settings is not an object, replacing it");
            ConfigTree::new()
        }
    };
    *slot = ConfigValue::Tree(merge(base, Some(record))).into();
    Value::Object(doc)
}
