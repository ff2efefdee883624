//! Collaborators supplied by the hosting system.
//!
//! The engine never reaches for ambient state. The base settings, the
//! permission check and CSRF verification all come in through these traits,
//! so the same manager runs inside a web host, a CLI, or a test.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ThemefigError;
use crate::types::ConfigTree;

/// Supplies the live base settings.
pub trait SettingsProvider {
    /// The merged global settings before any override is applied.
    fn global_settings(&self) -> Result<ConfigTree, ThemefigError>;
    /// Whether the active theme ships a settings document at all.
    fn has_theme_document(&self) -> bool;
}

pub trait PermissionGate {
    fn can_manage(&self) -> bool;
}

/// Verifies the CSRF token posted with the form.
pub trait NonceVerifier {
    fn verify(&self, action: &str, token: &str) -> bool;
}

/// Gate for local operators (the CLI): always allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionGate for AllowAll {
    fn can_manage(&self) -> bool {
        true
    }
}

impl PermissionGate for bool {
    fn can_manage(&self) -> bool {
        *self
    }
}

/// Accepts exactly one token for one action.
#[derive(Debug, Clone)]
pub struct FixedToken {
    pub action: String,
    pub token: String,
}

impl NonceVerifier for FixedToken {
    fn verify(&self, action: &str, token: &str) -> bool {
        action == self.action && token == self.token
    }
}

/// Base settings held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    settings: Option<ConfigTree>,
}

impl StaticSettings {
    pub fn new(settings: ConfigTree) -> Self {
        Self {
            settings: Some(settings),
        }
    }

    /// A provider for a theme without a settings document.
    pub fn missing() -> Self {
        Self { settings: None }
    }
}

impl SettingsProvider for StaticSettings {
    fn global_settings(&self) -> Result<ConfigTree, ThemefigError> {
        Ok(self.settings.clone().unwrap_or_default())
    }

    fn has_theme_document(&self) -> bool {
        self.settings.is_some()
    }
}

/// A `theme.json` file on disk. Its `settings` object is the base tree.
#[derive(Debug, Clone)]
pub struct ThemeFile {
    path: PathBuf,
}

impl ThemeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole parsed document.
    pub fn document(&self) -> Result<Value, ThemefigError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| ThemefigError::IoError {
            path: self.path.clone(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| ThemefigError::JsonError {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl SettingsProvider for ThemeFile {
    fn global_settings(&self) -> Result<ConfigTree, ThemefigError> {
        match self.document()? {
            Value::Object(mut doc) => match doc.remove("settings") {
                Some(Value::Object(settings)) => Ok(ConfigTree::from(settings)),
                Some(_) => Err(ThemefigError::InvalidValue {
                    key: "settings".into(),
                    reason: format!("{} has a non-object settings entry", self.path.display()),
                }),
                None => Ok(ConfigTree::new()),
            },
            _ => Err(ThemefigError::InvalidValue {
                key: "<document>".into(),
                reason: format!("{} is not a JSON object", self.path.display()),
            }),
        }
    }

    fn has_theme_document(&self) -> bool {
        self.path.is_file()
    }
}
