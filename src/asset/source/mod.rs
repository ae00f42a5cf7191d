//! Asset sources: where each asset's content comes from.
//!
//! | Source                  | Content                                          |
//! |-------------------------|--------------------------------------------------|
//! | [`BundledSource`]       | Text or bytes compiled into the binary            |
//! | [`RemoteSource`]        | A url or local path, fetched on load              |
//! | [`AppStylesSource`]     | The host application's stylesheet, rule-filtered  |
//! | [`SupportedPluginsSource`] | Sheets injected by known plugins               |
//! | [`MathJaxSource`]       | The MathJax sheet                                 |
//! | [`ThemeSource`]         | The active theme                                  |
//! | [`SnippetsSource`]      | Enabled CSS snippets                              |
//! | [`PluginStylesSource`]  | `styles.css` of selected plugins                  |
//! | [`VariablesSource`]     | Layout and accent custom properties               |
//! | [`FaviconSource`]       | Site icon                                         |
//! | [`CustomHeadSource`]    | HTML spliced into every page head                 |

mod app;
mod bundled;
mod fetch;
mod sheets;
mod variables;
mod vault;

pub use app::{AppStylesSource, MathJaxSource, SupportedPluginsSource};
pub use bundled::BundledSource;
pub use fetch::{Fetched, Fetcher, RemoteSource};
pub use sheets::{
    EmptyStyleSource, FileStyleSource, RuleFilter, SnapshotStyleSource, StyleSheet, StyleSource,
    split_rules,
};
pub use variables::VariablesSource;
pub use vault::{CustomHeadSource, FaviconSource, PluginStylesSource, SnippetsSource, ThemeSource};

use async_trait::async_trait;

use super::{AssetError, AssetRecord, LoadContext};
use crate::config::ExportOptions;

/// Whether a load produced new content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Changed,
    /// Content is still what the previous load produced.
    Unchanged,
}

/// Produces the content of one asset.
///
/// Implementations fill `record.data` (and optionally `source`,
/// `source_stat`, `file_name` or `kind`); target computation, stylesheet
/// rewriting and minification happen afterwards in
/// [`Asset::load`](super::Asset::load).
///
/// Returning [`LoadStatus::Unchanged`] skips that finishing step, so a
/// loader may only do so while [`LoadContext::generation`] is the one its
/// previous content was produced under.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError>;

    /// Markup override; `None` uses the generic form for the asset type.
    fn html(&self, _record: &AssetRecord, _options: &ExportOptions) -> Option<String> {
        None
    }
}
