//! `[vault]` section configuration.
//!
//! ```toml
//! [vault]
//! config_dir = ".obsidian"    # Vault settings folder (themes, snippets, plugins)
//! resources = "app"           # Stand-in for the host app's bundled resources
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Settings folder, relative to the vault root.
    pub config_dir: String,

    /// Directory that root-relative stylesheet urls resolve against.
    /// Empty means the vault root.
    pub resources: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            config_dir: ".obsidian".into(),
            resources: String::new(),
        }
    }
}

impl VaultConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.config_dir.trim().is_empty() {
            diag.error_with_hint(
                FieldPath::new("vault.config_dir"),
                "must not be empty",
                "the default is `.obsidian`",
            );
        }
    }
}
