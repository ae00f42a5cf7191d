//! Export configuration management for `vaultweb.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [vault], [export] and its sub-sections
//! ├── types/         # ConfigError, diagnostics, field paths
//! └── mod.rs         # ExportConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section                | Purpose                                     |
//! |------------------------|---------------------------------------------|
//! | `[vault]`              | Settings folder and app resource directory  |
//! | `[export]`             | Inclusion and inlining matrix, output paths |
//! | `[export.graph_view]`  | Graph view feature                          |
//! | `[export.sidebar]`     | Sidebars and their width                    |
//! | `[export.search]`      | Search feature                              |
//! | `[export.style]`       | Theme, plugin CSS, snippets, widths, accent |
//! | `[export.head]`        | Favicon and custom head content             |
//!
//! The file is optional: a vault without `vaultweb.toml` exports with the
//! documented defaults.

pub mod section;
pub mod types;

pub use section::{ExportOptions, VaultConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{cli::OptionArgs, debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, looked up in the vault root.
pub const CONFIG_FILE: &str = "vaultweb.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing vaultweb.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Config file the values came from (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Absolute vault root (internal use only)
    #[serde(skip)]
    pub vault_root: PathBuf,

    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub export: ExportOptions,
}

impl ExportConfig {
    /// Load configuration for the vault at `vault_root`.
    ///
    /// `config` overrides the default `<vault>/vaultweb.toml` location. CLI
    /// options are applied on top of the file before validation.
    pub fn load(vault_root: &Path, config: Option<&Path>, overrides: &OptionArgs) -> Result<Self> {
        let vault_root = fs::canonicalize(vault_root)
            .with_context(|| format!("vault `{}` not found", vault_root.display()))?;
        let config_path = match config {
            Some(path) => path.to_path_buf(),
            None => vault_root.join(CONFIG_FILE),
        };

        let mut loaded = if config_path.exists() {
            Self::from_path(&config_path)?
        } else if config.is_some() {
            return Err(ConfigError::Io(
                config_path,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            )
            .into());
        } else {
            debug!("config"; "no {} in vault, using defaults", CONFIG_FILE);
            Self::default()
        };

        loaded.config_path = config_path;
        loaded.vault_root = vault_root;
        loaded.apply_overrides(overrides);
        loaded.export.finalize();
        loaded.validate()?;
        Ok(loaded)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let mut diag = ConfigDiagnostics::new();
            for field in ignored {
                diag.warn(field, "unknown field, ignored");
            }
            log!("config"; "unknown fields in {}:", path.display());
            diag.print_warnings();
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, args: &OptionArgs) {
        let export = &mut self.export;
        if let Some(offline) = args.offline_resources {
            export.offline_resources = offline;
        }
        if args.no_css {
            export.include_css = false;
        }
        if args.no_js {
            export.include_js = false;
        }
        if args.inline_all {
            export.combine_as_single_file = true;
        }
        if args.no_minify {
            export.minify = false;
        }
    }

    /// Validate configuration. Collects all errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.vault.validate(&mut diag);
        self.export.validate(&mut diag);
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Vault settings folder (`<vault>/.obsidian`).
    pub fn config_dir(&self) -> PathBuf {
        self.vault_root.join(&self.vault.config_dir)
    }

    /// Plugins root (`<vault>/.obsidian/plugins`).
    pub fn plugins_dir(&self) -> PathBuf {
        self.config_dir().join("plugins")
    }

    /// Directory root-relative stylesheet urls resolve against.
    pub fn resources_dir(&self) -> PathBuf {
        if self.vault.resources.is_empty() {
            self.vault_root.clone()
        } else {
            self.vault_root.join(&self.vault.resources)
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ExportConfig {
    let (parsed, ignored) = ExportConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
