//! Fatal error taxonomy. Everything that is not a `DiscoveryError`
//! degrades to a recorded diagnostic instead of aborting the run.

use std::path::PathBuf;

use thiserror::Error;

/// The only error that stops the pipeline: the target root itself is
/// missing or unreadable. No partial artifact is produced.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("target root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("target root is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    #[error("target root is not readable: {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
