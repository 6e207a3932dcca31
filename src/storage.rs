//! `.scap` files on disk.

use crate::builder::encode_scapple;
use crate::error::{Result, ScappleError};
use crate::ir::Document;
use crate::parser::parse_scapple;
use std::path::Path;

pub const SCAP_EXTENSION: &str = "scap";

/// Accepts any path whose extension is `.scap`, case-insensitively.
pub fn validate_scap_path(path: &Path) -> Result<()> {
    let is_scap = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SCAP_EXTENSION));
    if is_scap {
        Ok(())
    } else {
        Err(ScappleError::InvalidPath {
            path: path.to_path_buf(),
        })
    }
}

pub fn read_document(path: &Path) -> Result<Document> {
    validate_scap_path(path)?;
    let markup = std::fs::read_to_string(path).map_err(|source| ScappleError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = parse_scapple(&markup)?;
    tracing::debug!(path = %path.display(), notes = doc.notes.len(), "read document");
    Ok(doc)
}

/// Encodes and writes `doc`, creating missing parent directories.
pub fn write_document(path: &Path, doc: &Document) -> Result<()> {
    validate_scap_path(path)?;
    let write_error = |source| ScappleError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, encode_scapple(doc)).map_err(write_error)?;
    tracing::debug!(path = %path.display(), notes = doc.notes.len(), "wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{DocumentInput, NoteInput, build_document};
    use crate::error::ErrorKind;
    use std::path::PathBuf;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("scapple-rs-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn extension_is_checked() {
        assert!(validate_scap_path(Path::new("map.scap")).is_ok());
        assert!(validate_scap_path(Path::new("MAP.SCAP")).is_ok());
        let err = validate_scap_path(Path::new("map.xml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoInvalidPath);
        assert!(validate_scap_path(Path::new("scap")).is_err());
    }

    #[test]
    fn writes_into_new_directories_and_reads_back() {
        let dir = scratch_dir();
        let path = dir.join("nested").join("map.scap");
        let doc = build_document(&DocumentInput {
            notes: vec![NoteInput {
                text: "hello".to_string(),
                ..NoteInput::default()
            }],
            background_color: Some("#eeeeee".to_string()),
        })
        .unwrap();

        write_document(&path, &doc).unwrap();
        let read = read_document(&path).unwrap();
        assert_eq!(read, doc);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = read_document(&scratch_dir().join("absent.scap")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoReadFailed);
        assert!(err.context()["filePath"].is_string());
    }
}
