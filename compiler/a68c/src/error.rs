//! Driver errors: what stops the driver outside any compiler phase.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Usage(String),
}

impl DriverError {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        DriverError::Usage(message.into())
    }
}
