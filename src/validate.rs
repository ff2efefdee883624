//! Strict-mode validation: detect unknown keys in the options file.
//!
//! Deserializes into `C::Layer` (all-optional fields) through `serde_ignored`
//! and reports every key the layer doesn't consume, with its line number.

use std::path::Path;

use confique::Config;
use serde::Deserialize;

use crate::error::ThemefigError;

/// Validate that a TOML options file contains no keys unknown to `C`.
pub fn validate_unknown_keys<C: Config>(content: &str, path: &Path) -> Result<(), ThemefigError>
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let mut unknown_keys: Vec<String> = Vec::new();

    let deserializer = toml::Deserializer::new(content);
    let _layer: C::Layer = serde_ignored::deserialize(deserializer, |ignored_path| {
        unknown_keys.push(ignored_path.to_string());
    })
    .map_err(|e| ThemefigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    if unknown_keys.is_empty() {
        return Ok(());
    }

    for key in &unknown_keys {
        tracing::warn!(%key, path = %path.display(), "unknown option");
    }

    let errors = unknown_keys
        .into_iter()
        .map(|key| {
            let line = find_key_line(content, &key);
            ThemefigError::UnknownKey {
                key,
                path: path.to_path_buf(),
                line,
            }
        })
        .collect();

    Err(ThemefigError::UnknownKeys(errors))
}

/// 1-indexed line of a top-level `key = ...` assignment, or 0 when not found.
///
/// Options are flat, so dotted keys only match when written as a dotted
/// assignment or inside the matching `[section]`.
fn find_key_line(content: &str, dotted_key: &str) -> usize {
    let (section, leaf) = match dotted_key.rsplit_once('.') {
        Some((s, l)) => (s, l),
        None => ("", dotted_key),
    };
    let mut current_section = String::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            current_section = header.trim().to_string();
            continue;
        }
        let candidate = if current_section == section {
            leaf
        } else if current_section.is_empty() {
            dotted_key
        } else {
            continue;
        };
        if let Some(after_key) = trimmed.strip_prefix(candidate)
            && after_key.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}
