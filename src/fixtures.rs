#[cfg(test)]
pub mod test {
    use serde_json::{Value, json};

    use crate::types::ConfigTree;

    /// Global settings shaped like a block theme's merged `settings` object.
    pub fn global_settings_json() -> Value {
        json!({
            "appearanceTools": true,
            "blocks": {
                "core/button": {"border": {"radius": true}}
            },
            "layout": {"contentSize": "650px", "wideSize": "1200px"},
            "color": {
                "custom": true,
                "customGradient": true,
                "defaultPalette": false,
                "link": false,
                "palette": {"theme": [{"slug": "base", "color": "#fff"}]}
            },
            "spacing": {
                "padding": true,
                "units": ["px", "em", "rem"],
                "spacingSizes": {"theme": []}
            },
            "typography": {
                "dropCap": false,
                "fluid": true,
                "fontSizes": {
                    "theme": [
                        {"slug": "small", "size": "0.9rem", "name": "Small"},
                        {"slug": "large", "size": "1.6rem", "name": "Large"}
                    ]
                },
                "fontFamilies": {
                    "theme": [{"slug": "body", "fontFamily": "serif"}]
                }
            },
            "useRootPaddingAwareAlignments": true
        })
    }

    pub fn global_settings() -> ConfigTree {
        serde_json::from_value(global_settings_json()).unwrap()
    }

    /// A whole theme.json document wrapping [`global_settings_json`].
    pub fn theme_document() -> Value {
        json!({
            "$schema": "https://schemas.wp.org/trunk/theme.json",
            "version": 2,
            "settings": global_settings_json(),
            "styles": {"color": {"background": "var(--wp--preset--color--base)"}},
            "templateParts": [{"name": "header", "area": "header"}]
        })
    }

    pub fn tree(v: Value) -> ConfigTree {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn fixture_parses() {
        let settings = global_settings();
        assert_eq!(settings.len(), 7);
        assert!(settings.get("typography").unwrap().as_tree().is_some());
    }
}
