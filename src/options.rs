//! Manager options: the tool's own configuration, separate from the theme
//! settings it edits.
//!
//! Resolution runs on pre-loaded data with no I/O, in precedence order:
//!
//! 1. Validate the options file (if strict)
//! 2. Parse it to a `toml::Table`
//! 3. Deep-merge `THEMEFIG__*` env vars on top
//! 4. Deserialize into the confique layer; confique fills defaults

use std::path::{Path, PathBuf};

use confique::Config;
use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::decode::DecodeOptions;
use crate::env;
use crate::error::ThemefigError;
use crate::validate;

/// Env var prefix for option overrides, e.g. `THEMEFIG__FONT_SIZE_ORIGIN`.
pub const ENV_PREFIX: &str = "THEMEFIG";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ManagerOptions {
    /// Name of the stored override record. The file store writes
    /// `{store_dir}/{option_name}.json`.
    #[config(default = "theme_json_manager")]
    pub option_name: String,

    /// Path to the theme's `theme.json`.
    pub theme_file: Option<PathBuf>,

    /// Directory holding the override record. Defaults to the platform data
    /// directory.
    pub store_dir: Option<PathBuf>,

    /// Preset origin restored when the font-size toggle is switched back on
    /// (`theme` or `default`).
    #[config(default = "theme")]
    pub font_size_origin: String,

    /// Action name the CSRF token is bound to.
    #[config(default = "theme-json-manager")]
    pub nonce_action: String,

    /// Form field carrying the CSRF token.
    #[config(default = "theme-json-manager-nonce")]
    pub nonce_field: String,
}

impl ManagerOptions {
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            font_size_origin: self.font_size_origin.clone(),
            nonce_field: self.nonce_field.clone(),
        }
    }

    /// The configured store directory, or the platform data directory.
    pub fn effective_store_dir(&self) -> Result<PathBuf, ThemefigError> {
        if let Some(dir) = &self.store_dir {
            return Ok(dir.clone());
        }
        let proj =
            directories::ProjectDirs::from("", "", "themefig").ok_or(ThemefigError::NoStoreDir)?;
        Ok(proj.data_dir().to_path_buf())
    }
}

/// All pre-loaded data needed to resolve options. No I/O happens here.
pub struct OptionsInput {
    /// Options file path and contents, if one was given.
    pub file: Option<(PathBuf, String)>,
    /// Raw environment variable pairs.
    pub env_vars: Vec<(String, String)>,
    /// Whether to reject unknown keys in the options file.
    pub strict: bool,
}

/// Resolve options from pre-loaded inputs.
pub fn resolve(input: OptionsInput) -> Result<ManagerOptions, ThemefigError> {
    let mut merged = Table::new();
    if let Some((path, content)) = &input.file {
        if input.strict {
            validate::validate_unknown_keys::<ManagerOptions>(content, path)?;
        }
        merged = toml::from_str(content).map_err(|e| ThemefigError::ParseError {
            path: path.clone(),
            source: e,
        })?;
    }

    let env_table = env::env_to_table(ENV_PREFIX, input.env_vars);
    merged = deep_merge(merged, env_table);

    let layer: <ManagerOptions as Config>::Layer = Value::Table(merged)
        .try_into()
        .map_err(|e: toml::de::Error| ThemefigError::InvalidValue {
            key: "<options>".into(),
            reason: e.to_string(),
        })?;

    ManagerOptions::builder()
        .preloaded(layer)
        .load()
        .map_err(ThemefigError::from)
}

/// Read the options file (if any) and the process environment, then resolve.
pub fn load(path: Option<&Path>) -> Result<ManagerOptions, ThemefigError> {
    let file = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|e| ThemefigError::IoError {
                path: p.to_path_buf(),
                source: e,
            })?;
            Some((p.to_path_buf(), content))
        }
        None => None,
    };
    let options = resolve(OptionsInput {
        file,
        env_vars: std::env::vars().collect(),
        strict: true,
    })?;
    tracing::debug!(?options, "manager options resolved");
    Ok(options)
}

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a Table for the same key, recurse.
/// Otherwise, `overlay`'s value wins.
fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(Value::Table(base_tbl)), Value::Table(overlay_tbl)) => {
                base.insert(key, Value::Table(deep_merge(base_tbl, overlay_tbl)));
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}
