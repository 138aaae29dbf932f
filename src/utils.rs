use std::fs;
use std::path::Path;

use tracing::error;

use crate::error::{Error, ErrorKind, Pos, Result};

/// Read a whole file into a string buffer.
///
/// Any I/O failure, including non UTF-8 content, is reported as
/// [`ErrorKind::FileUnavailable`].
pub fn read_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| {
        error!("Failed to read file {}: {}", path.display(), e);
        Error::with_message(
            ErrorKind::FileUnavailable,
            Pos::default(),
            format!("Cannot read file {}: {}", path.display(), e),
        )
    })
}
