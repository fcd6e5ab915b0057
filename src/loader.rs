//! Corpus loading: snapshot-first, with memory-bounded re-encoding.
//!
//! The loader prefers a prior snapshot (near-zero startup cost). On a
//! miss it reads the backing store in one shot, filters out records with
//! no usable text, truncates overlong text, and encodes one record at a
//! time into a pre-allocated half-precision array. The single-record
//! streaming policy is the memory ceiling: batch-encoding a whole corpus
//! at full precision spikes resident memory far beyond what a small
//! deployment allows.

use half::f16;
use tracing::{debug, info, warn};

use crate::embedding::TextEncoder;
use crate::error::{SearchError, SearchResult};
use crate::index::{FacultyRecord, VectorIndex};
use crate::snapshot::SnapshotStore;
use crate::store::FacultyStore;
use crate::types::FacultyId;

/// Builds a [`VectorIndex`] from a snapshot or from the backing store.
pub struct CorpusLoader<'a> {
    store: &'a dyn FacultyStore,
    encoder: &'a dyn TextEncoder,
    snapshot: &'a SnapshotStore,
    truncate_chars: usize,
}

impl<'a> CorpusLoader<'a> {
    pub fn new(
        store: &'a dyn FacultyStore,
        encoder: &'a dyn TextEncoder,
        snapshot: &'a SnapshotStore,
        truncate_chars: usize,
    ) -> Self {
        Self {
            store,
            encoder,
            snapshot,
            truncate_chars,
        }
    }

    /// Loads the index, preferring the snapshot path.
    ///
    /// # Errors
    /// `SearchError::EmptyCorpus` if the backing store yields zero usable
    /// records; encoding and store errors propagate.
    pub fn load(&self) -> SearchResult<VectorIndex> {
        if let Some(index) = self.snapshot.load() {
            info!(records = index.len(), "loaded vector index from snapshot");
            return Ok(index);
        }

        let index = self.rebuild()?;

        // A failed save costs the next startup an encoding pass, nothing more
        if let Err(e) = self.snapshot.save(&index) {
            warn!("failed to persist snapshot: {e}");
        }

        Ok(index)
    }

    /// Reads, filters, and encodes the corpus record by record,
    /// bypassing any existing snapshot. Does not persist the result.
    pub fn rebuild(&self) -> SearchResult<VectorIndex> {
        let rows = self.store.fetch_all()?;

        let mut records = Vec::new();
        let mut texts = Vec::new();

        for row in rows {
            let Some(id) = FacultyId::new(row.id) else {
                warn!("skipping faculty row with zero id");
                continue;
            };
            let Some(text) = row.semantic_text.as_deref() else {
                continue;
            };
            let truncated = truncate_chars(text, self.truncate_chars).trim();
            if truncated.is_empty() {
                continue;
            }

            records.push(FacultyRecord {
                id,
                text: truncated.to_lowercase(),
                name: row.name.to_lowercase(),
                qualification: row
                    .qualification
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase(),
            });
            texts.push(truncated.to_string());
        }

        if records.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }

        let dimension = self.encoder.dimension();
        let dim = dimension.get();
        info!(
            records = records.len(),
            dimension = dim,
            "encoding corpus one record at a time"
        );

        // Pre-allocate the whole f16 column; each embedding is down-cast
        // into its slot as soon as it is produced and the source text is
        // dropped by the consuming iterator
        let mut values = vec![f16::ZERO; records.len() * dim];
        let total = texts.len();
        for (i, text) in texts.into_iter().enumerate() {
            let embedding = self.encoder.encode(&text)?;
            dimension.validate_vector(&embedding)?;
            for (slot, value) in values[i * dim..(i + 1) * dim].iter_mut().zip(&embedding) {
                *slot = f16::from_f32(*value);
            }
            if i % 20 == 0 {
                debug!("encoded {i}/{total} records");
            }
        }

        VectorIndex::from_parts(records, values, dimension)
    }
}

/// Truncates to at most `max_chars` characters, respecting char
/// boundaries.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
