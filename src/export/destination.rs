//! Destination directory setup for attachment files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SplitError};

/// Resolve and create the destination directory.
///
/// A given directory is used verbatim; otherwise the current working
/// directory (absolute) is used. An already existing directory is fine; any
/// other creation failure is returned. With `create_parents`, missing parent
/// directories are created too.
pub fn prepare_destination(directory: Option<&Path>, create_parents: bool) -> Result<PathBuf> {
    let dir = match directory {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().map_err(SplitError::CurrentDir)?,
    };

    let created = if create_parents {
        std::fs::create_dir_all(&dir)
    } else {
        std::fs::create_dir(&dir)
    };

    match created {
        Ok(()) => debug!(path = %dir.display(), "Created destination directory"),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!(path = %dir.display(), "Destination directory already exists");
        }
        Err(source) => return Err(SplitError::DirectoryCreate { path: dir, source }),
    }

    Ok(dir)
}
