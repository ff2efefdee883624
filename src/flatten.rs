//! Flatten a settings tree into the checkbox fields of the override form.
//!
//! Only two levels are walked. Top-level scalars become one checkbox each;
//! top-level trees contribute one checkbox per nested scalar, plus a single
//! toggle for `fontSizes`. Every other nested list or object (font families,
//! palettes, spacing presets) is not editable and is skipped.

use crate::types::{
    ConfigTree, ConfigValue, FONT_SIZES_KEY, FieldDescriptor, FieldKind, FieldPath,
    OverrideRecord, is_excluded,
};

/// Flatten `tree` into form fields, in the tree's key order.
///
/// `{color: {custom: true}, useRootPaddingAwareAlignments: false}` →
/// `[color.custom (checked), useRootPaddingAwareAlignments (unchecked)]`
pub fn flatten(tree: &ConfigTree) -> Vec<FieldDescriptor> {
    let mut out = Vec::new();
    for (key, value) in tree.iter() {
        if is_excluded(key) {
            continue;
        }
        match value {
            ConfigValue::Tree(nested) => flatten_nested(key, nested, &mut out),
            // Lists have no checkbox representation at the top level. Their
            // elements are not walked either, so a top-level list never
            // yields fields even if it holds booleans.
            ConfigValue::Sequence(_) => {}
            scalar => out.push(FieldDescriptor {
                path: FieldPath::Top(key.to_string()),
                kind: FieldKind::Boolean,
                current_value: is_true(scalar),
            }),
        }
    }
    out
}

fn flatten_nested(key: &str, nested: &ConfigTree, out: &mut Vec<FieldDescriptor>) {
    for (nested_key, value) in nested.iter() {
        let path = FieldPath::Nested(key.to_string(), nested_key.to_string());
        match value {
            ConfigValue::Tree(_) | ConfigValue::Sequence(_) => {
                if nested_key == FONT_SIZES_KEY {
                    out.push(FieldDescriptor {
                        path,
                        kind: FieldKind::FontSizesToggle,
                        current_value: !is_empty_collection(value),
                    });
                }
            }
            scalar => out.push(FieldDescriptor {
                path,
                kind: FieldKind::Boolean,
                current_value: is_true(scalar),
            }),
        }
    }
}

/// Pick the tree the form should show: the stored override when one exists
/// and is non-empty, otherwise the live base settings.
pub fn editable_source<'a>(
    record: Option<&'a OverrideRecord>,
    base: &'a ConfigTree,
) -> &'a ConfigTree {
    match record {
        Some(r) if !r.settings.is_empty() => &r.settings,
        _ => base,
    }
}

fn is_true(value: &ConfigValue) -> bool {
    matches!(value, ConfigValue::Bool(true))
}

fn is_empty_collection(value: &ConfigValue) -> bool {
    match value {
        ConfigValue::Tree(t) => t.is_empty(),
        ConfigValue::Sequence(s) => s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{global_settings, tree};
    use serde_json::json;

    fn paths(fields: &[FieldDescriptor]) -> Vec<String> {
        fields.iter().map(|f| f.path.to_string()).collect()
    }

    #[test]
    fn empty_tree_yields_no_fields() {
        assert!(flatten(&ConfigTree::new()).is_empty());
    }

    #[test]
    fn top_level_scalar() {
        let fields = flatten(&tree(json!({"useRootPaddingAwareAlignments": true})));
        assert_eq!(fields.len(), 1);
        assert_eq!(
            fields[0].path,
            FieldPath::Top("useRootPaddingAwareAlignments".into())
        );
        assert_eq!(fields[0].kind, FieldKind::Boolean);
        assert!(fields[0].current_value);
    }

    #[test]
    fn top_level_list_yields_no_fields() {
        let fields = flatten(&tree(json!({
            "flags": [true, false],
            "presets": [{"slug": "a"}],
            "color": {"custom": true}
        })));
        assert_eq!(paths(&fields), vec!["color.custom"]);
    }

    #[test]
    fn non_boolean_scalar_is_unchecked() {
        let fields = flatten(&tree(json!({"mode": "on", "count": 1})));
        assert_eq!(fields.len(), 2);
        assert!(fields.iter().all(|f| !f.current_value));
    }

    #[test]
    fn excluded_keys_are_skipped() {
        let fields = flatten(&tree(json!({
            "blocks": {"core/paragraph": {"x": true}},
            "layout": {"contentSize": "600px"},
            "appearanceTools": true,
            "color": {"custom": true}
        })));
        assert_eq!(paths(&fields), vec!["color.custom"]);
    }

    #[test]
    fn nested_scalars_become_fields() {
        let fields = flatten(&tree(json!({"color": {"custom": true, "link": false}})));
        assert_eq!(paths(&fields), vec!["color.custom", "color.link"]);
        assert!(fields[0].current_value);
        assert!(!fields[1].current_value);
    }

    #[test]
    fn font_sizes_toggle_from_origin_tree() {
        let fields = flatten(&tree(json!({
            "typography": {"fontSizes": {"theme": [{"slug": "s"}]}}
        })));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].kind, FieldKind::FontSizesToggle);
        assert!(fields[0].current_value);
    }

    #[test]
    fn font_sizes_toggle_from_stored_sequence() {
        let enabled = flatten(&tree(json!({"typography": {"fontSizes": [{"slug": "s"}]}})));
        assert!(enabled[0].current_value);

        let disabled = flatten(&tree(json!({"typography": {"fontSizes": []}})));
        assert_eq!(disabled[0].kind, FieldKind::FontSizesToggle);
        assert!(!disabled[0].current_value);
    }

    #[test]
    fn other_nested_collections_omitted() {
        let fields = flatten(&tree(json!({
            "typography": {
                "fontFamilies": {"theme": []},
                "dropCap": true
            },
            "spacing": {"units": ["px"], "spacingSizes": {"theme": []}}
        })));
        assert_eq!(paths(&fields), vec!["typography.dropCap"]);
    }

    #[test]
    fn does_not_descend_past_two_levels() {
        let fields = flatten(&tree(json!({"a": {"b": {"c": true}}})));
        assert!(fields.is_empty());
    }

    #[test]
    fn follows_tree_order() {
        let fields = flatten(&global_settings());
        assert_eq!(
            paths(&fields),
            vec![
                "color.custom",
                "color.customGradient",
                "color.defaultPalette",
                "color.link",
                "spacing.padding",
                "typography.dropCap",
                "typography.fluid",
                "typography.fontSizes",
                "useRootPaddingAwareAlignments",
            ]
        );
    }

    #[test]
    fn editable_source_prefers_non_empty_record() {
        let base = global_settings();
        let record = OverrideRecord::new(tree(json!({"color": {"custom": false}})));
        assert_eq!(editable_source(Some(&record), &base), &record.settings);
    }

    #[test]
    fn editable_source_falls_back_to_base() {
        let base = global_settings();
        let empty = OverrideRecord::new(ConfigTree::new());
        assert_eq!(editable_source(Some(&empty), &base), &base);
        assert_eq!(editable_source(None, &base), &base);
    }
}
