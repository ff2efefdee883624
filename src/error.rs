use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThemefigError {
    #[error("Unknown option '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown options in config file")]
    UnknownKeys(Vec<ThemefigError>),

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse JSON in {path}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("No theme document configured — pass --theme or set theme_file")]
    NoThemeFile,

    #[error("No store directory could be determined — set store_dir")]
    NoStoreDir,
}
