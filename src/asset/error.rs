//! Asset-level errors and per-child skip reasons.
//!
//! None of these cross the registry boundary: a failed load leaves the
//! asset empty and the registry's filters drop it.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::PathViolation;

/// Why an asset could not produce content.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid path `{path}`: {reason}")]
    Validation { path: String, reason: PathViolation },

    #[error("failed to fetch `{url}`: {reason}")]
    Fetch { url: String, reason: String },

    #[error("`{url}` answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("`{url}` did not answer within {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("`{url}` skipped: offline resources are disabled")]
    Offline { url: String },

    #[error("export cancelled")]
    Cancelled,

    #[error("malformed color `{0}`")]
    MalformedColor(String),

    #[error("cannot decode payload: {0}")]
    Decode(String),
}

impl AssetError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Expected absence (offline mode, cancellation) rather than a fault.
    pub fn is_quiet(&self) -> bool {
        matches!(self, Self::Offline { .. } | Self::Cancelled)
    }
}

/// Why a stylesheet reference was left as written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("empty url")]
    Empty,
    #[error("fragment reference")]
    Fragment,
    #[error("data uri kept inline")]
    InlineData,
    #[error("external url while offline resources are disabled")]
    Online,
    #[error("not a usable url")]
    InvalidUrl,
    #[error("unavailable: {0}")]
    Unavailable(String),
}
