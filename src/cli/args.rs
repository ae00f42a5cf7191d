//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::asset::AssetType;

/// Export an Obsidian vault as a self-contained static website
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: <vault>/vaultweb.toml)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Export rendered pages together with every asset they need
    #[command(visible_alias = "e")]
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Directory of rendered `.html` pages, mirroring the vault layout
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        pages: PathBuf,

        /// Output directory
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Load the asset registry and list what an export would write
    #[command(visible_alias = "a")]
    Assets {
        #[command(flatten)]
        source: SourceArgs,

        /// Only list assets of this type
        #[arg(short = 't', long = "type", value_enum)]
        kind: Option<AssetType>,

        #[command(flatten)]
        options: OptionArgs,
    },
}

/// Where vault content and live styles come from.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Vault root directory
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub vault: PathBuf,

    /// Stylesheets of the rendering host: a JSON snapshot or a directory of
    /// CSS files
    #[arg(long, value_hint = clap::ValueHint::AnyPath)]
    pub styles: Option<PathBuf>,
}

/// Overrides for `[export]` options.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// Download remote resources instead of linking to them
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub offline_resources: Option<bool>,

    /// Leave out every stylesheet
    #[arg(long)]
    pub no_css: bool,

    /// Leave out every script
    #[arg(long)]
    pub no_js: bool,

    /// Embed every asset into the pages
    #[arg(long)]
    pub inline_all: bool,

    /// Skip minification of scripts and stylesheets
    #[arg(long)]
    pub no_minify: bool,
}

impl Commands {
    pub fn source(&self) -> &SourceArgs {
        match self {
            Self::Export { source, .. } | Self::Assets { source, .. } => source,
        }
    }

    pub fn options(&self) -> &OptionArgs {
        match self {
            Self::Export { options, .. } | Self::Assets { options, .. } => options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export() {
        let cli = Cli::try_parse_from([
            "vaultweb", "export", "--vault", "v", "-p", "rendered", "-o", "site",
            "--offline-resources=false", "--no-js",
        ])
        .unwrap();
        let Commands::Export { source, pages, output, options } = &cli.command else {
            panic!("expected export");
        };
        assert_eq!(source.vault, PathBuf::from("v"));
        assert_eq!(pages, &PathBuf::from("rendered"));
        assert_eq!(output, &PathBuf::from("site"));
        assert_eq!(options.offline_resources, Some(false));
        assert!(options.no_js);
        assert!(!options.no_css);
    }

    #[test]
    fn test_parse_assets_type_filter() {
        let cli = Cli::try_parse_from(["vaultweb", "assets", "--vault", "v", "-t", "font", "-V"]).unwrap();
        assert!(cli.verbose);
        let Commands::Assets { kind, .. } = &cli.command else {
            panic!("expected assets");
        };
        assert_eq!(*kind, Some(AssetType::Font));
        assert!(cli.command.source().styles.is_none());
    }

    #[test]
    fn test_bare_flag_means_true() {
        let cli = Cli::try_parse_from(["vaultweb", "assets", "--vault", "v", "--offline-resources"]).unwrap();
        assert_eq!(cli.command.options().offline_resources, Some(true));
    }
}
