//! Snapshot persistence for the vector index.
//!
//! A snapshot is a pair of artifacts under one directory:
//! - `vectors.bin`: a small header (magic, version, dimension, count,
//!   all little-endian u32) followed by the raw f16 bits of the value
//!   column.
//! - `metadata.json`: side-table with ids and the lowercase record
//!   fields, plus the model name the vectors were encoded with.
//!
//! Writes go to a temporary file in the same directory and are published
//! with an atomic rename, so a snapshot on disk is either complete or
//! absent. Loads validate everything they can; any corruption, version
//! or length mismatch reports absence so the corpus loader falls back to
//! re-encoding instead of serving a partially valid index.

use half::f16;
use memmap2::{Mmap, MmapOptions};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{SearchError, SearchResult};
use crate::index::{FacultyRecord, VectorIndex};
use crate::types::{FacultyId, VectorDimension};

/// Magic bytes identifying a vector snapshot file.
const MAGIC_BYTES: &[u8; 4] = b"FVEC";

/// Current snapshot format version.
const SNAPSHOT_VERSION: u32 = 1;

/// Size of the vectors.bin header in bytes.
const HEADER_SIZE: usize = 16;

/// Bytes per stored f16 value.
const BYTES_PER_F16: usize = 2;

/// Side-table persisted next to the raw vector array.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotMetadata {
    version: u32,
    model_name: String,
    dimension: usize,
    ids: Vec<FacultyId>,
    records: Vec<FacultyRecord>,
}

/// Persists and restores [`VectorIndex`] snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    model_name: String,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            model_name: model_name.into(),
        }
    }

    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self::new(settings.data_dir.clone(), settings.model.name.clone())
    }

    fn vectors_path(&self) -> PathBuf {
        self.dir.join("vectors.bin")
    }

    fn metadata_path(&self) -> PathBuf {
        self.dir.join("metadata.json")
    }

    /// True when both snapshot artifacts are present.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.vectors_path().exists() && self.metadata_path().exists()
    }

    /// Persists the index as a fresh snapshot.
    pub fn save(&self, index: &VectorIndex) -> SearchResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SearchError::Storage {
            message: format!("failed to create snapshot dir '{}': {e}", self.dir.display()),
            suggestion: "Check directory permissions".to_string(),
        })?;

        let metadata = SnapshotMetadata {
            version: SNAPSHOT_VERSION,
            model_name: self.model_name.clone(),
            dimension: index.dimension().get(),
            ids: index.ids().collect(),
            records: index.records().to_vec(),
        };
        let json = serde_json::to_vec(&metadata).map_err(|e| SearchError::Storage {
            message: format!("failed to serialize snapshot metadata: {e}"),
            suggestion: "This is likely a bug in the code".to_string(),
        })?;

        let mut vectors = Vec::with_capacity(HEADER_SIZE + index.values().len() * BYTES_PER_F16);
        vectors.extend_from_slice(MAGIC_BYTES);
        vectors.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        vectors.extend_from_slice(&(index.dimension().get() as u32).to_le_bytes());
        vectors.extend_from_slice(&(index.len() as u32).to_le_bytes());
        for value in index.values() {
            vectors.extend_from_slice(&value.to_bits().to_le_bytes());
        }

        // Vectors first so a crash between the two writes leaves the old
        // metadata pointing at consistent data or no snapshot at all
        self.write_atomic(&self.vectors_path(), &vectors)?;
        self.write_atomic(&self.metadata_path(), &json)?;

        debug!(
            records = index.len(),
            dimension = index.dimension().get(),
            "snapshot saved to {}",
            self.dir.display()
        );
        Ok(())
    }

    /// Loads the snapshot if present and well-formed.
    ///
    /// Any read error, corruption, or length mismatch is reported as
    /// absence (with a warning) rather than an error, forcing callers
    /// down the regeneration path.
    pub fn load(&self) -> Option<VectorIndex> {
        if !self.exists() {
            return None;
        }

        match self.try_load() {
            Ok(index) => {
                debug!(
                    records = index.len(),
                    "snapshot loaded from {}",
                    self.dir.display()
                );
                Some(index)
            }
            Err(e) => {
                warn!(
                    "ignoring invalid snapshot at {}: {e}",
                    self.dir.display()
                );
                None
            }
        }
    }

    fn try_load(&self) -> SearchResult<VectorIndex> {
        let metadata = self.read_metadata()?;

        if metadata.version > SNAPSHOT_VERSION {
            return Err(self.corrupt(format!(
                "snapshot version {} is newer than supported version {SNAPSHOT_VERSION}",
                metadata.version
            )));
        }
        if metadata.model_name != self.model_name {
            return Err(self.corrupt(format!(
                "snapshot was encoded with model '{}', expected '{}'",
                metadata.model_name, self.model_name
            )));
        }
        if metadata.ids.len() != metadata.records.len() {
            return Err(self.corrupt(format!(
                "id table has {} entries but side-table has {} records",
                metadata.ids.len(),
                metadata.records.len()
            )));
        }
        for (id, record) in metadata.ids.iter().zip(&metadata.records) {
            if *id != record.id {
                return Err(self.corrupt("id table does not match record side-table".to_string()));
            }
        }

        let mmap = self.map_vectors()?;
        let (dimension, count) = Self::read_header(&mmap).map_err(|m| self.corrupt(m))?;

        if dimension.get() != metadata.dimension {
            return Err(self.corrupt(format!(
                "vector array dimension {} does not match metadata dimension {}",
                dimension.get(),
                metadata.dimension
            )));
        }
        if count != metadata.ids.len() {
            return Err(self.corrupt(format!(
                "vector array has {count} rows but metadata lists {} ids",
                metadata.ids.len()
            )));
        }

        let expected = HEADER_SIZE + count * dimension.get() * BYTES_PER_F16;
        if mmap.len() != expected {
            return Err(self.corrupt(format!(
                "vector array is {} bytes, expected {expected}",
                mmap.len()
            )));
        }

        let values: Vec<f16> = mmap[HEADER_SIZE..]
            .chunks_exact(BYTES_PER_F16)
            .map(|chunk| f16::from_bits(u16::from_le_bytes([chunk[0], chunk[1]])))
            .collect();

        VectorIndex::from_parts(metadata.records, values, dimension)
    }

    fn read_metadata(&self) -> SearchResult<SnapshotMetadata> {
        let json =
            std::fs::read_to_string(self.metadata_path()).map_err(|e| SearchError::Storage {
                message: format!("failed to read snapshot metadata: {e}"),
                suggestion: "Rebuild the snapshot".to_string(),
            })?;
        serde_json::from_str(&json).map_err(|e| self.corrupt(format!("invalid metadata: {e}")))
    }

    fn map_vectors(&self) -> SearchResult<Mmap> {
        let file = File::open(self.vectors_path()).map_err(|e| SearchError::Storage {
            message: format!("failed to open vector array: {e}"),
            suggestion: "Rebuild the snapshot".to_string(),
        })?;
        // Safety: the file is never truncated while mapped; snapshots are
        // replaced by atomic rename, which keeps the old inode alive
        unsafe { MmapOptions::new().map(&file) }.map_err(|e| SearchError::Storage {
            message: format!("failed to map vector array: {e}"),
            suggestion: "Rebuild the snapshot".to_string(),
        })
    }

    fn read_header(mmap: &Mmap) -> Result<(VectorDimension, usize), String> {
        if mmap.len() < HEADER_SIZE {
            return Err("vector array too small to contain header".to_string());
        }
        if &mmap[0..4] != MAGIC_BYTES {
            return Err("invalid magic bytes".to_string());
        }

        let version = u32::from_le_bytes([mmap[4], mmap[5], mmap[6], mmap[7]]);
        if version != SNAPSHOT_VERSION {
            return Err(format!(
                "vector array version {version}, expected {SNAPSHOT_VERSION}"
            ));
        }

        let dim = u32::from_le_bytes([mmap[8], mmap[9], mmap[10], mmap[11]]) as usize;
        let dimension = VectorDimension::new(dim).map_err(|e| e.to_string())?;
        let count = u32::from_le_bytes([mmap[12], mmap[13], mmap[14], mmap[15]]) as usize;

        Ok((dimension, count))
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> SearchResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| SearchError::Storage {
            message: format!("failed to create temp file in '{}': {e}", self.dir.display()),
            suggestion: "Check disk space and directory permissions".to_string(),
        })?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.flush())
            .map_err(|e| SearchError::Storage {
                message: format!("failed to write snapshot data: {e}"),
                suggestion: "Check disk space".to_string(),
            })?;
        tmp.persist(path).map_err(|e| SearchError::Storage {
            message: format!("failed to publish '{}': {e}", path.display()),
            suggestion: "Check directory permissions".to_string(),
        })?;
        Ok(())
    }

    fn corrupt(&self, message: String) -> SearchError {
        SearchError::Storage {
            message,
            suggestion: "Delete the snapshot directory and rebuild it".to_string(),
        }
    }
}
