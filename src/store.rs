//! Backing store contract for faculty records.
//!
//! The search core treats the record source as an external collaborator
//! behind [`FacultyStore`]: a one-shot bulk read at load time. The SQL
//! database, scraper, and CSV pipeline that feed it live outside this
//! crate; [`JsonFacultyStore`] is the minimal concrete store used by the
//! CLI and by offline snapshot generation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SearchError, SearchResult};

/// One faculty row as supplied by the backing store.
///
/// Fields are named and typed up front rather than accessed positionally;
/// validation (non-empty text, non-zero id) happens once in the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacultyRow {
    /// Externally assigned stable id (non-zero)
    pub id: u32,

    /// Combined profile text used for embedding (bio, research
    /// interests, publications)
    pub semantic_text: Option<String>,

    /// Faculty member's name
    pub name: String,

    /// Qualification string, if known
    pub qualification: Option<String>,
}

/// One-shot bulk reader for faculty records.
pub trait FacultyStore {
    /// Fetch all faculty rows from the backing store.
    fn fetch_all(&self) -> SearchResult<Vec<FacultyRow>>;
}

/// Store backed by a JSON file containing an array of [`FacultyRow`]s.
#[derive(Debug, Clone)]
pub struct JsonFacultyStore {
    path: PathBuf,
}

impl JsonFacultyStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl FacultyStore for JsonFacultyStore {
    fn fetch_all(&self) -> SearchResult<Vec<FacultyRow>> {
        let data = std::fs::read_to_string(&self.path).map_err(|e| SearchError::Storage {
            message: format!("failed to read faculty data '{}': {e}", self.path.display()),
            suggestion: "Check that the data file exists and is readable".to_string(),
        })?;

        serde_json::from_str(&data).map_err(|e| SearchError::Storage {
            message: format!("failed to parse faculty data '{}': {e}", self.path.display()),
            suggestion: "The file must contain a JSON array of faculty rows".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_store_reads_rows() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("faculty.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 1, "semantic_text": "expert in distributed systems", "name": "Asha Patel", "qualification": "PhD"},
                {"id": 2, "semantic_text": null, "name": "Raj Mehta", "qualification": null}
            ]"#,
        )
        .unwrap();

        let store = JsonFacultyStore::new(&path);
        let rows = store.fetch_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].name, "Asha Patel");
        assert!(rows[1].semantic_text.is_none());
    }

    #[test]
    fn test_json_store_missing_file() {
        let store = JsonFacultyStore::new("/nonexistent/faculty.json");
        let err = store.fetch_all().unwrap_err();
        assert_eq!(err.status_code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_json_store_malformed_json() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("faculty.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFacultyStore::new(&path);
        assert!(store.fetch_all().is_err());
    }
}
