//! Array persistence.
//!
//! [`ArrayStore`] is the seam import/export filters go through. The bundled
//! [`JsonArrayStore`] keeps one JSON document per array under a root
//! directory; locations are relative paths without an extension.

use crate::data::DataArray;
use crate::types::ElementType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No array stored at '{0}'")]
    NotFound(String),

    #[error("Invalid location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("Malformed array document '{location}': {reason}")]
    Malformed { location: String, reason: String },

    #[error("IO error at '{location}': {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },
}

/// Structure of a stored array, readable without its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayHeader {
    pub name: String,
    pub element_type: ElementType,
    pub components: usize,
    pub tuples: usize,
}

impl ArrayHeader {
    pub fn of(array: &DataArray) -> Self {
        Self {
            name: array.name().to_string(),
            element_type: array.element_type(),
            components: array.component_count(),
            tuples: array.tuple_count(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ArrayStore: Send + Sync {
    fn describe(&self, location: &str) -> Result<ArrayHeader, StoreError>;

    fn read_array(&self, location: &str) -> Result<DataArray, StoreError>;

    fn write_array(&self, array: &DataArray, location: &str) -> Result<(), StoreError>;
}

#[derive(Serialize, Deserialize)]
struct ArrayDocument {
    header: ArrayHeader,
    array: DataArray,
}

#[derive(Deserialize)]
struct HeaderOnly {
    header: ArrayHeader,
}

/// One pretty-printed JSON file per array.
#[derive(Debug, Clone)]
pub struct JsonArrayStore {
    root: PathBuf,
}

impl JsonArrayStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `location`. Rejects absolute paths and `..`.
    pub fn file_for(&self, location: &str) -> Result<PathBuf, StoreError> {
        let invalid = |reason: &str| StoreError::InvalidLocation {
            location: location.to_string(),
            reason: reason.to_string(),
        };
        if location.is_empty() {
            return Err(invalid("location is empty"));
        }
        let relative = Path::new(location);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(invalid("must be a relative path inside the store")),
            }
        }
        Ok(self.root.join(relative).with_extension("json"))
    }

    fn read_text(&self, location: &str) -> Result<String, StoreError> {
        let path = self.file_for(location)?;
        fs::read_to_string(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(location.to_string()),
            _ => StoreError::Io {
                location: location.to_string(),
                source,
            },
        })
    }
}

impl ArrayStore for JsonArrayStore {
    fn describe(&self, location: &str) -> Result<ArrayHeader, StoreError> {
        let text = self.read_text(location)?;
        let doc: HeaderOnly = serde_json::from_str(&text).map_err(|e| StoreError::Malformed {
            location: location.to_string(),
            reason: e.to_string(),
        })?;
        Ok(doc.header)
    }

    fn read_array(&self, location: &str) -> Result<DataArray, StoreError> {
        let text = self.read_text(location)?;
        let malformed = |reason: String| StoreError::Malformed {
            location: location.to_string(),
            reason,
        };
        let doc: ArrayDocument = serde_json::from_str(&text).map_err(|e| malformed(e.to_string()))?;
        doc.array
            .check_invariant()
            .map_err(|e| malformed(e.to_string()))?;
        if ArrayHeader::of(&doc.array) != doc.header {
            return Err(malformed("header does not match array contents".into()));
        }
        Ok(doc.array)
    }

    fn write_array(&self, array: &DataArray, location: &str) -> Result<(), StoreError> {
        let path = self.file_for(location)?;
        let io = |source| StoreError::Io {
            location: location.to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io)?;
        }
        let doc = ArrayDocument {
            header: ArrayHeader::of(array),
            array: array.clone(),
        };
        let text = serde_json::to_string_pretty(&doc).map_err(|e| StoreError::Malformed {
            location: location.to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&path, text).map_err(io)?;
        tracing::debug!(location, path = %path.display(), "Array written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_describe_and_read() {
        let dir = TempDir::new().unwrap();
        let store = JsonArrayStore::new(dir.path());
        let array = DataArray::from_vec("Ids", vec![1i32, 2, 3, 4, 5, 6], 2).unwrap();

        store.write_array(&array, "run1/ids").unwrap();
        assert!(dir.path().join("run1/ids.json").exists());

        let header = store.describe("run1/ids").unwrap();
        assert_eq!(header.element_type, ElementType::I32);
        assert_eq!(header.components, 2);
        assert_eq!(header.tuples, 3);

        assert_eq!(store.read_array("run1/ids").unwrap(), array);
    }

    #[test]
    fn test_missing_location() {
        let dir = TempDir::new().unwrap();
        let store = JsonArrayStore::new(dir.path());
        assert!(matches!(
            store.read_array("nothing"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_rejects_escaping_locations() {
        let store = JsonArrayStore::new("/tmp/store");
        assert!(matches!(
            store.file_for("../etc/passwd"),
            Err(StoreError::InvalidLocation { .. })
        ));
        assert!(matches!(
            store.file_for("/abs"),
            Err(StoreError::InvalidLocation { .. })
        ));
        assert!(store.file_for("").is_err());
        assert_eq!(
            store.file_for("a/b").unwrap(),
            PathBuf::from("/tmp/store/a/b.json")
        );
    }

    #[test]
    fn test_tampered_document_is_malformed() {
        let dir = TempDir::new().unwrap();
        let store = JsonArrayStore::new(dir.path());
        let array = DataArray::from_vec("Mask", vec![1u8, 0, 1], 1).unwrap();
        store.write_array(&array, "mask").unwrap();

        let path = dir.path().join("mask.json");
        let text = fs::read_to_string(&path).unwrap();
        fs::write(&path, text.replacen("\"tuples\": 3", "\"tuples\": 4", 1)).unwrap();

        assert!(matches!(
            store.read_array("mask"),
            Err(StoreError::Malformed { .. })
        ));
    }
}
