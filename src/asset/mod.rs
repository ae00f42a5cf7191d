//! Asset pipeline: records, sources, stylesheet rewriting and the registry.
//!
//! # Module Structure
//!
//! ```text
//! asset/
//! ├── kind.rs       # AssetType, InlinePolicy, Mutability, LoadMethod, Feature
//! ├── record.rs     # AssetRecord, Asset and the shared load step
//! ├── html.rs       # Markup forms of an asset
//! ├── route.rs      # lib/ folder layout
//! ├── style.rs      # url() discovery and child assets
//! ├── minify.rs     # CSS/JS minification
//! ├── source/       # Where content comes from
//! ├── builtin.rs    # Assets every export ships
//! └── registry.rs   # Scheduling and the filtered views
//! ```

mod builtin;
mod context;
mod error;
mod html;
mod kind;
pub mod minify;
mod record;
mod registry;
mod route;
pub mod source;
mod style;

pub use context::{LoadContext, VaultPaths};
pub use error::{AssetError, SkipReason};
pub use kind::{AssetType, Feature, InlinePolicy, LoadMethod, Mutability};
pub use record::{Asset, AssetData, AssetRecord, ChildReport, LoadOutcome, SourceStat};
pub use registry::{AssetRegistry, Download};
pub use route::LibraryLayout;

// ============================================================================
// Test Helpers (available to all asset modules via `use crate::asset::test_*`)
// ============================================================================

#[cfg(test)]
pub use test_support::{FixedStyleSource, test_config, test_context, test_context_with};
