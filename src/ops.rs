//! Manager operations: list fields, save, reset, and produce the effective
//! settings, plus the result type callers display.
//!
//! Everything here assumes the caller is allowed to manage settings. The
//! permission and CSRF gates live in [`page`](crate::page).

use std::fmt;

use serde_json::Value;

use crate::decode::{self, DecodeOptions, Submission};
use crate::error::ThemefigError;
use crate::flatten;
use crate::host::SettingsProvider;
use crate::merge;
use crate::store::OverrideStore;
use crate::types::{ConfigTree, FieldDescriptor, FieldKind, OverrideRecord};

/// A manager operation, independent of any transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerAction {
    /// List the editable fields with their current state.
    Fields,
    /// Decode a submission and replace the stored override with it.
    Save { submission: Submission },
    /// Delete the stored override.
    Reset,
    /// Show the effective settings (base with the override applied).
    Effective,
    /// Show the stored override record, if any.
    Show,
}

/// Result of a manager operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerResult {
    Fields(Vec<FieldDescriptor>),
    Saved(OverrideRecord),
    Reset,
    Effective(ConfigTree),
    Record(Option<OverrideRecord>),
}

impl fmt::Display for ManagerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagerResult::Fields(fields) => {
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", FieldLine(field))?;
                }
                Ok(())
            }
            ManagerResult::Saved(_) => write!(f, "Settings saved."),
            ManagerResult::Reset => write!(f, "Settings reset."),
            ManagerResult::Effective(tree) => write!(f, "{}", pretty(tree)),
            ManagerResult::Record(Some(record)) => write!(f, "{}", pretty(record)),
            ManagerResult::Record(None) => write!(f, "No overrides saved."),
        }
    }
}

/// One `[x] color.custom` line of a field listing.
pub struct FieldLine<'a>(pub &'a FieldDescriptor);

impl fmt::Display for FieldLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.0.current_value { "x" } else { " " };
        write!(f, "[{mark}] {}", self.0.path)?;
        if self.0.kind == FieldKind::FontSizesToggle {
            write!(f, " (presets)")?;
        }
        Ok(())
    }
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}

/// Ties a settings provider to an override store.
pub struct ThemeManager<P, S> {
    provider: P,
    store: S,
    decode_options: DecodeOptions,
}

impl<P: SettingsProvider, S: OverrideStore> ThemeManager<P, S> {
    pub fn new(provider: P, store: S) -> Self {
        Self {
            provider,
            store,
            decode_options: DecodeOptions::default(),
        }
    }

    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode_options = options;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn decode_options(&self) -> &DecodeOptions {
        &self.decode_options
    }

    pub fn handle(&self, action: &ManagerAction) -> Result<ManagerResult, ThemefigError> {
        match action {
            ManagerAction::Fields => self.fields().map(ManagerResult::Fields),
            ManagerAction::Save { submission } => self.save(submission).map(ManagerResult::Saved),
            ManagerAction::Reset => {
                self.reset()?;
                Ok(ManagerResult::Reset)
            }
            ManagerAction::Effective => self.effective().map(ManagerResult::Effective),
            ManagerAction::Show => self.store.get().map(ManagerResult::Record),
        }
    }

    /// Fields for the form: from the stored override when it has content,
    /// otherwise from the live base settings.
    pub fn fields(&self) -> Result<Vec<FieldDescriptor>, ThemefigError> {
        let record = self.store.get()?;
        let base = self.provider.global_settings()?;
        Ok(flatten::flatten(flatten::editable_source(record.as_ref(), &base)))
    }

    /// Rebuild the override from `submission` and store it, replacing any
    /// previous record.
    pub fn save(&self, submission: &Submission) -> Result<OverrideRecord, ThemefigError> {
        let base = self.provider.global_settings()?;
        let record = decode::build_record(submission, &base, &self.decode_options);
        self.store.set(&record)?;
        tracing::info!(keys = record.settings.len(), "override saved");
        Ok(record)
    }

    pub fn reset(&self) -> Result<(), ThemefigError> {
        self.store.delete()?;
        tracing::info!("override reset to theme defaults");
        Ok(())
    }

    pub fn effective(&self) -> Result<ConfigTree, ThemefigError> {
        let base = self.provider.global_settings()?;
        let record = self.store.get()?;
        Ok(merge::merge(base, record.as_ref()))
    }

    /// The filter hook: apply the stored override to a full theme document.
    pub fn filter(&self, document: Value) -> Result<Value, ThemefigError> {
        let record = self.store.get()?;
        Ok(merge::apply_to_document(document, record.as_ref()))
    }

    /// Lifecycle hook for deactivation and uninstall.
    pub fn teardown(&self) -> Result<(), ThemefigError> {
        tracing::debug!("tearing down, removing override record");
        self.store.delete()
    }
}
