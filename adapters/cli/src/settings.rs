//! Player settings loaded from an optional TOML file.

use std::{fs, path::Path};

use snake3d_core::GameplaySettings;

/// Loads settings, falling back to the defaults when the file is missing,
/// unreadable, or malformed.
pub(crate) fn load_or_default(path: &Path) -> GameplaySettings {
    let Ok(contents) = fs::read_to_string(path) else {
        return GameplaySettings::default();
    };
    toml::from_str(&contents).unwrap_or_default()
}
