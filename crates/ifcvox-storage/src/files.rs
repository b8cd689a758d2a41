use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::{Result, StorageError};

/// Appends `suffix` to the final path component (`1.vox` + `.meta` → `1.vox.meta`).
pub(crate) fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(base.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

/// Reads a file that must exist.
pub(crate) fn read_required(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound {
            path: path.to_path_buf(),
        },
        _ => StorageError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Reads a file that may legitimately be absent.
pub(crate) fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_keeps_existing_extension() {
        let p = with_suffix(Path::new("/tmp/job/3.vox"), ".contents");
        assert_eq!(p, PathBuf::from("/tmp/job/3.vox.contents"));
    }

    #[test]
    fn test_missing_required_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_required(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
        assert!(read_optional(&dir.path().join("nope")).unwrap().is_none());
    }
}
