use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single repository's migration. Caught by the driver at the
/// repository boundary; never aborts the batch.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("destination repository `{name}` already holds content ({size} KB)")]
    DestinationConflict { name: String, size: u64 },

    #[error("provider request failed: {0:#}")]
    Provider(#[from] anyhow::Error),

    #[error("`{operation}` exited with {status}: {output}")]
    Transport {
        operation: String,
        status: String,
        output: String,
    },

    #[error("could not clean scratch directory {path:?}: {source}")]
    Scratch {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("repository name `{0}` is not usable as a scratch directory")]
    InvalidName(String),

    #[error("refusing to pass `{0}` to git, it would be read as an option")]
    OptionLikeArgument(String),
}

/// Fatal problems with the persisted batch state, detected before any
/// repository is processed. The lists are left as found for the operator to
/// repair.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("batch file {0:?} not found, run `reposhift list` first")]
    BatchMissing(PathBuf),

    #[error("batch contains repository `{0}` more than once")]
    DuplicateName(String),

    #[error("{path:?} lists repository `{name}` more than once")]
    DuplicateEntry { path: PathBuf, name: String },

    #[error("repository `{0}` is recorded as both migrated and failed")]
    RecordedTwice(String),
}
