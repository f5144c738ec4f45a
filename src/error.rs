//! Error types for loading grids and word lists.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning structure and word files into a `GridConfig` and `WordList`, or while
/// writing rendered output. An unfillable grid is not an error; the solver reports that as `None`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("structure contains no rows")]
    EmptyStructure,
}

pub type Result<T> = std::result::Result<T, Error>;
