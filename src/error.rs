//! Error taxonomy surfaced to the embedding shell.
//!
//! Internals use `anyhow` with context; this enum is the boundary type a GUI
//! (or any other caller) matches on to present a message. Nothing is
//! swallowed: store failures and decode failures propagate instead of
//! degrading into empty results.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The document bytes are not valid UTF-8. No partial detection results
    /// are produced for such a file.
    #[error("failed to decode {path} as UTF-8 text")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("failed to read {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to back up {path}")]
    FileBackup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mapping store unreachable or corrupt. Fatal to the current operation,
    /// not to the process; the caller may retry or pick another store.
    #[error("mapping store error")]
    Store(#[from] anyhow::Error),

    #[error("no document session is active")]
    NoActiveSession,
}

pub type CoreResult<T> = Result<T, CoreError>;
