//! Clap adapter for the `themefig` binary.
//!
//! Compiled only with the `clap` Cargo feature (on by default). The only
//! bridge to the core is [`ManagerCommand::into_action()`], which turns parsed
//! arguments into a [`ManagerAction`]; everything downstream goes through
//! [`ThemeManager::handle()`](crate::ThemeManager::handle).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::decode::Submission;
use crate::error::ThemefigError;
use crate::host::{SettingsProvider, StaticSettings, ThemeFile};
use crate::ops::{ManagerAction, ThemeManager};
use crate::options::ManagerOptions;
use crate::page::PageOutcome;
use crate::store::JsonFileStore;

/// Inspect, override, and reset a theme's theme.json settings.
#[derive(Debug, Parser)]
#[command(name = "themefig", version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: ManagerCommand,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Options file (TOML). Unknown keys are rejected.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the theme's theme.json. Overrides `theme_file`.
    #[arg(long, global = true)]
    pub theme: Option<PathBuf>,

    /// Directory holding the override record. Overrides `store_dir`.
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ManagerCommand {
    /// List the editable settings and whether each is enabled.
    Fields,
    /// Save a new override from form-style NAME=VALUE pairs.
    ///
    /// Names are `key` or `key[nested]`; values follow the form rules
    /// ("true" enables, anything else disables, "[]" empties fontSizes).
    Save {
        /// Pairs such as `color[custom]=false` or `typography[fontSizes]=[]`.
        #[arg(value_name = "NAME=VALUE")]
        fields: Vec<String>,
    },
    /// Delete the stored override and return to the theme defaults.
    Reset,
    /// Print the effective settings with the override applied.
    Effective,
    /// Print the stored override record.
    Show,
}

impl ManagerCommand {
    /// Convert parsed arguments into a transport-agnostic `ManagerAction`.
    pub fn into_action(self) -> Result<ManagerAction, ThemefigError> {
        Ok(match self {
            ManagerCommand::Fields => ManagerAction::Fields,
            ManagerCommand::Save { fields } => ManagerAction::Save {
                submission: parse_pairs(&fields)?,
            },
            ManagerCommand::Reset => ManagerAction::Reset,
            ManagerCommand::Effective => ManagerAction::Effective,
            ManagerCommand::Show => ManagerAction::Show,
        })
    }
}

/// Run a parsed command against resolved options and return the text to print.
///
/// `--theme` and `--store-dir` win over `opts`. Reset only touches the store,
/// so it works without a theme path.
pub fn run(cli: Cli, mut opts: ManagerOptions) -> Result<String, ThemefigError> {
    if let Some(theme) = cli.global.theme {
        opts.theme_file = Some(theme);
    }
    if let Some(dir) = cli.global.store_dir {
        opts.store_dir = Some(dir);
    }

    let store = JsonFileStore::new(&opts.effective_store_dir()?, &opts.option_name);
    let action = cli.command.into_action()?;
    if action == ManagerAction::Reset {
        let manager = ThemeManager::new(StaticSettings::missing(), store);
        return Ok(manager.handle(&action)?.to_string());
    }

    let theme_path = opts.theme_file.clone().ok_or(ThemefigError::NoThemeFile)?;
    let manager =
        ThemeManager::new(ThemeFile::new(theme_path), store).with_decode_options(opts.decode_options());
    if !manager.provider().has_theme_document() {
        return Ok(PageOutcome::NoThemeDocument.to_string());
    }
    Ok(manager.handle(&action)?.to_string())
}

fn parse_pairs(fields: &[String]) -> Result<Submission, ThemefigError> {
    let mut submission = Submission::new();
    for field in fields {
        let (name, value) = field
            .split_once('=')
            .ok_or_else(|| ThemefigError::InvalidValue {
                key: field.clone(),
                reason: "expected NAME=VALUE".into(),
            })?;
        submission.push(name, value);
    }
    Ok(submission)
}
