//! Configuration section definitions.
//!
//! Each module corresponds to a section in `vaultweb.toml`:
//!
//! | Module     | TOML Section                    | Purpose                         |
//! |------------|---------------------------------|---------------------------------|
//! | `vault`    | `[vault]`                       | Vault layout                    |
//! | `export`   | `[export]`                      | Inlining and inclusion matrix   |
//! | `features` | `[export.graph_view]` and peers | Page features                   |
//! | `style`    | `[export.style]`, `[export.head]` | Theme, snippets, head content |

mod export;
mod features;
mod style;
mod vault;

pub use export::ExportOptions;
pub use features::{GraphViewOptions, SearchOptions, SidebarOptions};
pub use style::{HeadOptions, StyleOptions};
pub use vault::VaultConfig;
