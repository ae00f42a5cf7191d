use std::path::PathBuf;

use thiserror::Error;

/// Failure of a whole export. Output already written stays in place.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: no pages were found")]
    NothingToExport,

    #[error("cannot write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("export cancelled")]
    Cancelled,
}
