//! Override a theme's `theme.json` settings without editing the theme.
//!
//! Themefig presents a subset of a theme's settings as checkboxes, stores the
//! user's choices as a small override record, and merges that record onto
//! the theme's settings whenever the document is requested.
//!
//! ```ignore
//! let manager = ThemeManager::new(ThemeFile::new("theme.json"), MemoryStore::new());
//! manager.save(&Submission::from_pairs([("color[custom]", "false")]))?;
//! let effective = manager.effective()?;
//! ```
//!
//! # The three transformations
//!
//! Everything with real behavior is a pure function over in-memory trees:
//!
//! - **[`flatten`]** walks a settings tree, two levels deep, and yields one
//!   [`FieldDescriptor`] per editable checkbox. Top-level `blocks`, `layout`
//!   and `appearanceTools` are never shown.
//! - **[`decode`]** turns a raw form submission back into a typed override
//!   tree. Checkboxes arrive as the strings `"true"`/`"false"`; anything other
//!   than `"true"` decodes to `false`.
//! - **[`merge`]** applies the override onto the base settings. A nested
//!   override like `color.custom` replaces only that leaf; its siblings keep
//!   their base values.
//!
//! # Value model
//!
//! Settings are JSON without a schema. They are lifted once into
//! [`ConfigValue`], a tagged union of `Bool`, `Tree`, `Sequence` and
//! `Opaque`, and every transformation is a pattern match over it. Trees keep
//! insertion order so fields appear in the order the theme declares them.
//!
//! # Font sizes
//!
//! The whole `typography.fontSizes` preset list is edited through a single
//! toggle. Unchecked, the form posts `"[]"` and the override stores an empty
//! list. Checked, the decoder re-reads the live presets rather than trusting
//! the submission, which carries no size data: a flat `typography.fontSizes`
//! list as in a raw `theme.json`, or the configured origin
//! (`typography.fontSizes.theme` by default) in merged global settings.
//!
//! Font families can be switched off (`"false"` stores an empty list) but
//! there is no path that restores them: any other value leaves the key unset.
//!
//! # Collaborators
//!
//! The base settings, permission check, CSRF verification and persistence
//! are traits in [`host`] and [`store`]. [`ThemeManager`] ties a
//! [`SettingsProvider`] to an [`OverrideStore`] and exposes the operations;
//! [`AdminPage`] adds the permission and token gates around them for a form
//! transport.
//!
//! # Options
//!
//! [`ManagerOptions`] configures the tool itself (record name, theme path,
//! store directory, font-size origin, nonce names). It is a confique struct
//! resolved from an optional TOML file, validated strictly, with
//! `THEMEFIG__*` environment variables layered on top.
//!
//! # Error handling
//!
//! The transformations never fail: malformed values are coerced and shape
//! mismatches resolve in the override's favor. Only I/O and option loading
//! return [`ThemefigError`].

pub mod error;
pub mod host;
pub mod options;
pub mod store;
pub mod types;

#[cfg(feature = "clap")]
pub mod cli;
pub mod decode;
mod env;
pub mod flatten;
pub mod merge;
mod ops;
pub mod page;
mod validate;

#[cfg(test)]
mod fixtures;

pub use decode::{DecodeOptions, Submission};
pub use error::ThemefigError;
pub use host::{
    AllowAll, FixedToken, NonceVerifier, PermissionGate, SettingsProvider, StaticSettings,
    ThemeFile,
};
pub use merge::{apply_to_document, merge};
pub use ops::{FieldLine, ManagerAction, ManagerResult, ThemeManager};
pub use options::ManagerOptions;
pub use page::{AdminPage, Method, Notice, PageOutcome, PageRequest};
pub use store::{JsonFileStore, MemoryStore, OverrideStore};
pub use types::{
    ConfigTree, ConfigValue, FieldDescriptor, FieldKind, FieldPath, OverrideRecord,
};
