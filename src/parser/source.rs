//! Message source: the raw bytes of one message, from a named file or standard input.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SplitError};

/// Read the complete raw message.
///
/// With a path, the file is read in binary mode; without one, standard input
/// is read to EOF. The whole message is buffered for the parser.
pub fn read_message(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => read_file(path),
        None => read_from(std::io::stdin().lock()).map_err(SplitError::Stdin),
    }
}

/// Read a message file.
fn read_file(path: &Path) -> Result<Vec<u8>> {
    let data = std::fs::read(path).map_err(|e| SplitError::input(path, e))?;
    debug!(path = %path.display(), bytes = data.len(), "Read message file");
    Ok(data)
}

/// Read any byte stream to its end.
pub fn read_from(mut reader: impl Read) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    debug!(bytes = data.len(), "Read message stream");
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_named_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("msg.eml");
        std::fs::write(&path, b"Subject: x\r\n\r\nbody").unwrap();
        assert_eq!(read_message(Some(&path)).unwrap(), b"Subject: x\r\n\r\nbody");
    }

    #[test]
    fn test_missing_file_is_input_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.eml");
        let err = read_message(Some(&path)).unwrap_err();
        assert!(matches!(err, SplitError::InputUnavailable { .. }));
        assert!(err.to_string().contains("absent.eml"));
    }

    #[test]
    fn test_read_from_stream() {
        let data: &[u8] = b"\x00\xFFbinary";
        assert_eq!(read_from(data).unwrap(), data);
    }
}
