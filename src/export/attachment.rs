//! File sink: write attachment payloads into the destination directory.

use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};

/// Write `payload` to `output_dir/filename`, then report the path on `diag`.
///
/// An existing file of the same name is truncated and overwritten.
pub fn write_attachment<D: Write>(
    diag: &mut D,
    output_dir: &Path,
    filename: &str,
    payload: &[u8],
) -> Result<PathBuf> {
    let path = output_dir.join(filename);

    let mut file = File::create(&path).map_err(|e| SplitError::attachment(&path, e))?;
    file.write_all(payload)
        .and_then(|()| file.flush())
        .map_err(|e| SplitError::attachment(&path, e))?;
    drop(file);

    writeln!(diag, "Decoded attachment file --> '{}'", path.display())
        .and_then(|()| diag.flush())
        .map_err(SplitError::Output)?;

    Ok(path)
}

/// Make a declared filename safe to join onto the destination directory.
///
/// Path separators and NUL become `_`, and the special names `.` and `..`
/// become `_`, so the result always names an entry directly inside the
/// destination.
pub fn neutralize_filename(name: &str) -> Cow<'_, str> {
    if name == "." || name == ".." {
        return Cow::Borrowed("_");
    }
    if name.contains(['/', '\\', '\0']) {
        Cow::Owned(name.replace(['/', '\\', '\0'], "_"))
    } else {
        Cow::Borrowed(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_attachment_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let mut diag = Vec::new();
        let path = write_attachment(&mut diag, tmp.path(), "a.bin", b"\x00\x01\x02").unwrap();

        assert_eq!(path, tmp.path().join("a.bin"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x00\x01\x02");
        assert_eq!(
            String::from_utf8(diag).unwrap(),
            format!("Decoded attachment file --> '{}'\n", path.display())
        );
    }

    #[test]
    fn test_write_attachment_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.txt"), b"a much longer previous content").unwrap();
        let mut diag = Vec::new();
        write_attachment(&mut diag, tmp.path(), "a.txt", b"new").unwrap();
        assert_eq!(std::fs::read(tmp.path().join("a.txt")).unwrap(), b"new");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let mut diag = Vec::new();
        let err = write_attachment(&mut diag, &missing, "a.txt", b"x").unwrap_err();
        assert!(matches!(err, SplitError::AttachmentWrite { .. }));
        assert!(diag.is_empty());
    }

    #[test]
    fn test_neutralize_filename() {
        assert_eq!(neutralize_filename("report.pdf"), "report.pdf");
        assert_eq!(neutralize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(neutralize_filename("/abs/path.txt"), "_abs_path.txt");
        assert_eq!(neutralize_filename("c:\\temp\\x.doc"), "c:_temp_x.doc");
        assert_eq!(neutralize_filename(".."), "_");
        assert_eq!(neutralize_filename("."), "_");
        assert_eq!(neutralize_filename("..hidden"), "..hidden");
    }
}
