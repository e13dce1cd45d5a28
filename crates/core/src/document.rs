//! JSON document IO shared by the task, snapshot, and settings files.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::PersistenceError;

/// Read and parse a document. A missing file is `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| PersistenceError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

/// Serialize `value` as pretty JSON and replace `path` atomically.
///
/// The document is written to a temporary file in the same directory and renamed
/// over the target, so the previous contents survive a failed write.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let write_err = |source: io::Error| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };

    let body = serde_json::to_vec_pretty(value)
        .map_err(|err| write_err(io::Error::new(io::ErrorKind::InvalidData, err)))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(&body).map_err(write_err)?;
    // Temp files are owner-only; keep the mode the document already has.
    let permissions = match fs::metadata(path) {
        Ok(existing) => Some(existing.permissions()),
        Err(_) => new_document_permissions(),
    };
    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions).map_err(write_err)?;
    }
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|err| write_err(err.error))?;

    tracing::debug!(path = %path.display(), bytes = body.len(), "document saved");
    Ok(())
}

#[cfg(unix)]
fn new_document_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_document_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_document_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let value: Option<Vec<String>> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn malformed_document_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "[1, 2").unwrap();
        let err = read_json::<Vec<u32>>(&path).unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(err.path(), &path);
    }

    #[test]
    fn write_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        write_json(&path, &vec!["a"]).unwrap();
        write_json(&path, &vec!["b", "c"]).unwrap();
        let value: Vec<String> = read_json(&path).unwrap().unwrap();
        assert_eq!(value, vec!["b".to_string(), "c".to_string()]);

        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temporary files should be renamed away");
    }

    #[test]
    fn write_into_unwritable_target_fails() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("as-dir");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();
        let err = write_json(&target, &vec![1]).unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
    }

    #[test]
    fn failed_write_keeps_previous_document() {
        struct Unserializable;

        impl Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("refused"))
            }
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        write_json(&path, &vec!["a"]).unwrap();

        let err = write_json(&path, &Unserializable).unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));

        let value: Vec<String> = read_json(&path).unwrap().unwrap();
        assert_eq!(value, vec!["a".to_string()]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn saved_documents_are_not_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        write_json(&path, &vec!["a"]).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);

        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        write_json(&path, &vec!["b"]).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }
}
