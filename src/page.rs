//! The admin page flow: gate checks, save/reset on POST, then the form.
//!
//! Gates run before anything else. A missing theme document or a caller
//! without permission gets a message and never reaches a mutation path; a
//! POST whose CSRF token fails verification is rejected the same way.

use std::fmt;

use crate::decode::Submission;
use crate::error::ThemefigError;
use crate::host::{NonceVerifier, PermissionGate, SettingsProvider};
use crate::ops::{FieldLine, ThemeManager};
use crate::options::ManagerOptions;
use crate::store::OverrideStore;
use crate::types::FieldDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub method: Method,
    pub submission: Submission,
}

impl PageRequest {
    pub fn get() -> Self {
        Self {
            method: Method::Get,
            submission: Submission::new(),
        }
    }

    pub fn post(submission: Submission) -> Self {
        Self {
            method: Method::Post,
            submission,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Saved,
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    NoThemeDocument,
    PermissionDenied,
    InvalidNonce,
    Form {
        notice: Option<Notice>,
        fields: Vec<FieldDescriptor>,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Saved => write!(f, "Settings saved."),
            Notice::Reset => write!(f, "Settings reset."),
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageOutcome::NoThemeDocument => {
                write!(f, "This theme does not have a theme.json file.")
            }
            PageOutcome::PermissionDenied => write!(
                f,
                "You do not have permission to manage theme.json settings."
            ),
            PageOutcome::InvalidNonce => write!(f, "The link you followed has expired."),
            PageOutcome::Form { notice, fields } => {
                if let Some(notice) = notice {
                    writeln!(f, "{notice}")?;
                }
                writeln!(f, "Configure and override theme.json settings.")?;
                writeln!(
                    f,
                    "Font families, adding custom font sizes, and adding custom spacing presets is not supported."
                )?;
                for field in fields {
                    writeln!(f, "{}", FieldLine(field))?;
                }
                Ok(())
            }
        }
    }
}

/// Serves the settings page on top of a [`ThemeManager`].
pub struct AdminPage<'a, P, S> {
    manager: &'a ThemeManager<P, S>,
    gate: &'a dyn PermissionGate,
    verifier: &'a dyn NonceVerifier,
    nonce_action: String,
}

impl<'a, P: SettingsProvider, S: OverrideStore> AdminPage<'a, P, S> {
    pub fn new(
        manager: &'a ThemeManager<P, S>,
        gate: &'a dyn PermissionGate,
        verifier: &'a dyn NonceVerifier,
    ) -> Self {
        Self {
            manager,
            gate,
            verifier,
            nonce_action: "theme-json-manager".into(),
        }
    }

    /// A page whose token action comes from `options`. The token field name
    /// follows the manager's decode options.
    pub fn with_options(
        manager: &'a ThemeManager<P, S>,
        gate: &'a dyn PermissionGate,
        verifier: &'a dyn NonceVerifier,
        options: &ManagerOptions,
    ) -> Self {
        Self::new(manager, gate, verifier).nonce_action(&options.nonce_action)
    }

    pub fn nonce_action(mut self, action: &str) -> Self {
        self.nonce_action = action.to_string();
        self
    }

    pub fn respond(&self, request: &PageRequest) -> Result<PageOutcome, ThemefigError> {
        if !self.manager.provider().has_theme_document() {
            return Ok(PageOutcome::NoThemeDocument);
        }
        if !self.gate.can_manage() {
            tracing::warn!("settings page requested without permission");
            return Ok(PageOutcome::PermissionDenied);
        }

        let notice = match request.method {
            Method::Get => None,
            Method::Post => {
                let field = &self.manager.decode_options().nonce_field;
                let token = request.submission.get(field).unwrap_or_default();
                if !self.verifier.verify(&self.nonce_action, token) {
                    tracing::warn!(%field, "rejected submission with an invalid token");
                    return Ok(PageOutcome::InvalidNonce);
                }
                self.apply(&request.submission)?
            }
        };

        let fields = self.manager.fields()?;
        Ok(PageOutcome::Form { notice, fields })
    }

    fn apply(&self, submission: &Submission) -> Result<Option<Notice>, ThemefigError> {
        if submission.contains("reset") {
            self.manager.reset()?;
            return Ok(Some(Notice::Reset));
        }
        if submission.contains("submit") {
            self.manager.save(submission)?;
            return Ok(Some(Notice::Saved));
        }
        tracing::debug!("post without submit or reset, nothing to do");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{global_settings, tree};
    use crate::host::{AllowAll, FixedToken, StaticSettings};
    use crate::store::MemoryStore;
    use crate::types::OverrideRecord;
    use serde_json::json;

    fn verifier() -> FixedToken {
        FixedToken {
            action: "theme-json-manager".into(),
            token: "good".into(),
        }
    }

    fn manager_with(store: MemoryStore) -> ThemeManager<StaticSettings, MemoryStore> {
        ThemeManager::new(StaticSettings::new(global_settings()), store)
    }

    fn post(pairs: &[(&str, &str)]) -> PageRequest {
        PageRequest::post(Submission::from_pairs(pairs.iter().copied()))
    }

    #[test]
    fn get_renders_base_fields() {
        let m = manager_with(MemoryStore::new());
        let v = verifier();
        let page = AdminPage::new(&m, &AllowAll, &v);
        match page.respond(&PageRequest::get()).unwrap() {
            PageOutcome::Form { notice, fields } => {
                assert_eq!(notice, None);
                assert_eq!(fields.len(), 9);
            }
            other => panic!("Expected Form, got {other:?}"),
        }
    }

    #[test]
    fn missing_theme_document_shows_message() {
        let m = ThemeManager::new(StaticSettings::missing(), MemoryStore::new());
        let v = verifier();
        let page = AdminPage::new(&m, &AllowAll, &v);
        let outcome = page
            .respond(&post(&[("theme-json-manager-nonce", "good"), ("submit", "Save")]))
            .unwrap();
        assert_eq!(outcome, PageOutcome::NoThemeDocument);
        assert!(outcome.to_string().contains("does not have a theme.json"));
        assert_eq!(m.store().get().unwrap(), None);
    }

    #[test]
    fn denied_caller_cannot_mutate() {
        let existing = OverrideRecord::new(tree(json!({"a": true})));
        let m = manager_with(MemoryStore::with_record(existing.clone()));
        let v = verifier();
        let page = AdminPage::new(&m, &false, &v);
        let outcome = page
            .respond(&post(&[("theme-json-manager-nonce", "good"), ("reset", "Reset")]))
            .unwrap();
        assert_eq!(outcome, PageOutcome::PermissionDenied);
        assert!(outcome.to_string().contains("permission"));
        assert_eq!(m.store().get().unwrap(), Some(existing));
    }

    #[test]
    fn bad_token_rejected() {
        let m = manager_with(MemoryStore::new());
        let v = verifier();
        let page = AdminPage::new(&m, &AllowAll, &v);
        let outcome = page
            .respond(&post(&[
                ("theme-json-manager-nonce", "forged"),
                ("submit", "Save"),
                ("a", "true"),
            ]))
            .unwrap();
        assert_eq!(outcome, PageOutcome::InvalidNonce);
        assert_eq!(m.store().get().unwrap(), None);
    }

    #[test]
    fn missing_token_rejected() {
        let m = manager_with(MemoryStore::new());
        let v = verifier();
        let page = AdminPage::new(&m, &AllowAll, &v);
        let outcome = page.respond(&post(&[("submit", "Save")])).unwrap();
        assert_eq!(outcome, PageOutcome::InvalidNonce);
    }

    #[test]
    fn submit_saves_and_renders_record() {
        let m = manager_with(MemoryStore::new());
        let v = verifier();
        let page = AdminPage::new(&m, &AllowAll, &v);
        let outcome = page
            .respond(&post(&[
                ("theme-json-manager-nonce", "good"),
                ("_wp_http_referer", "/wp-admin/themes.php?page=theme_json_manager"),
                ("color[custom] ", "false"),
                ("color[link] ", "false"),
                ("color[link] ", "true"),
                ("submit", "Save"),
            ]))
            .unwrap();
        match &outcome {
            PageOutcome::Form { notice, fields } => {
                assert_eq!(*notice, Some(Notice::Saved));
                assert_eq!(fields.len(), 2);
            }
            other => panic!("Expected Form, got {other:?}"),
        }
        assert!(outcome.to_string().starts_with("Settings saved."));
        let stored = m.store().get().unwrap().unwrap();
        assert_eq!(stored.settings, tree(json!({"color": {"custom": false, "link": true}})));
    }

    #[test]
    fn reset_deletes_record() {
        let m = manager_with(MemoryStore::with_record(OverrideRecord::new(tree(
            json!({"a": true}),
        ))));
        let v = verifier();
        let page = AdminPage::new(&m, &AllowAll, &v);
        let outcome = page
            .respond(&post(&[("theme-json-manager-nonce", "good"), ("reset", "Reset")]))
            .unwrap();
        assert!(matches!(
            outcome,
            PageOutcome::Form {
                notice: Some(Notice::Reset),
                ..
            }
        ));
        assert_eq!(m.store().get().unwrap(), None);
    }

    #[test]
    fn custom_nonce_action() {
        let m = manager_with(MemoryStore::new());
        let v = FixedToken {
            action: "custom".into(),
            token: "t".into(),
        };
        let page = AdminPage::new(&m, &AllowAll, &v).nonce_action("custom");
        let outcome = page
            .respond(&post(&[("theme-json-manager-nonce", "t"), ("submit", "Save")]))
            .unwrap();
        assert!(matches!(
            outcome,
            PageOutcome::Form {
                notice: Some(Notice::Saved),
                ..
            }
        ));
    }

    #[test]
    fn token_names_follow_options() {
        use crate::options::{OptionsInput, resolve};

        let opts = resolve(OptionsInput {
            file: None,
            env_vars: vec![
                ("THEMEFIG__NONCE_ACTION".into(), "save-overrides".into()),
                ("THEMEFIG__NONCE_FIELD".into(), "_token".into()),
            ],
            strict: true,
        })
        .unwrap();
        let m = manager_with(MemoryStore::new()).with_decode_options(opts.decode_options());
        let v = FixedToken {
            action: "save-overrides".into(),
            token: "t".into(),
        };
        let request = post(&[("_token", "t"), ("submit", "Save"), ("a", "true")]);

        let default_page = AdminPage::new(&m, &AllowAll, &v);
        assert_eq!(default_page.respond(&request).unwrap(), PageOutcome::InvalidNonce);
        assert_eq!(m.store().get().unwrap(), None);

        let page = AdminPage::with_options(&m, &AllowAll, &v, &opts);
        assert!(matches!(
            page.respond(&request).unwrap(),
            PageOutcome::Form {
                notice: Some(Notice::Saved),
                ..
            }
        ));
        assert_eq!(m.store().get().unwrap().unwrap().settings, tree(json!({"a": true})));
    }

    #[test]
    fn form_display_lists_fields() {
        let outcome = PageOutcome::Form {
            notice: None,
            fields: vec![FieldDescriptor {
                path: crate::types::FieldPath::Top("useRootPaddingAwareAlignments".into()),
                kind: crate::types::FieldKind::Boolean,
                current_value: true,
            }],
        };
        let text = outcome.to_string();
        assert!(text.contains("[x] useRootPaddingAwareAlignments"));
        assert!(text.contains("not supported"));
    }
}
