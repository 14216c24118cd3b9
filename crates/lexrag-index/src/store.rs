//! The Index Store: a process-wide singleton over per-collection retrieval
//! artifacts, with safe concurrent reload.
//!
//! Grounded on `ploke-embed::runtime::EmbeddingRuntime`'s atomic
//! snapshot-swap pattern: readers take a cheap `Arc` clone of the current
//! snapshot and never block a concurrent `force_reload`, which publishes a
//! brand-new snapshot in one atomic store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::collection::Collection;
use crate::dense::DenseIndex;
use crate::ingest::{self, RawRow};
use crate::sparse::Bm25Index;

pub type Snapshot = Arc<HashMap<String, Collection>>;

#[derive(Debug, Clone, Copy)]
pub struct StoreStatus {
    pub total_collections: usize,
    pub usable_collections: usize,
}

pub struct IndexStore {
    data_dir: PathBuf,
    snapshot: ArcSwap<HashMap<String, Collection>>,
    initialized: AtomicBool,
}

impl IndexStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            snapshot: ArcSwap::from_pointee(HashMap::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Populate the store if it has not yet been initialized; otherwise
    /// return the existing snapshot unchanged (pointer-equal to whatever a
    /// prior `initialize()` returned). A missing data directory is not an
    /// error: the store simply starts empty and the service runs degraded.
    pub fn initialize(&self) -> Snapshot {
        if self.initialized.load(Ordering::Acquire) {
            return self.snapshot.load_full();
        }
        self.force_reload()
    }

    /// Rebuild the snapshot from disk unconditionally and publish it
    /// atomically. Concurrent readers observe either the full old snapshot
    /// or the full new one, never a partial state.
    pub fn force_reload(&self) -> Snapshot {
        let built = Arc::new(self.scan());
        self.snapshot.store(built.clone());
        self.initialized.store(true, Ordering::Release);
        built
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.load_full()
    }

    pub fn status(&self) -> StoreStatus {
        let snap = self.snapshot.load();
        let total_collections = snap.len();
        let usable_collections = snap.values().filter(|c| c.is_usable()).count();
        StoreStatus { total_collections, usable_collections }
    }

    pub fn clear(&self) {
        self.snapshot.store(Arc::new(HashMap::new()));
        self.initialized.store(false, Ordering::Release);
    }

    fn scan(&self) -> HashMap<String, Collection> {
        let mut collections: HashMap<String, Collection> = HashMap::new();
        let entries = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.data_dir.display(), error = %e, "data directory unavailable, starting degraded");
                return collections;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let fname = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };
            self.classify_and_load(&path, &fname, &mut collections);
        }
        collections
    }

    fn classify_and_load(&self, path: &Path, fname: &str, collections: &mut HashMap<String, Collection>) {
        if let Some(stem) = fname.strip_suffix(".faiss") {
            match DenseIndex::load(path) {
                Ok(idx) => {
                    debug!(collection = stem, vectors = idx.len(), "loaded dense index");
                    collections.entry(stem.to_string()).or_insert_with(|| Collection::new(stem)).dense = Some(idx);
                }
                Err(e) => warn!(file = fname, error = %e, "failed to load dense index, skipping"),
            }
        } else if let Some(key) = fname.split("_bm25.").next().filter(|_| fname.contains("_bm25.")) {
            match Bm25Index::load(path) {
                Ok(idx) => {
                    debug!(collection = key, docs = idx.len(), "loaded sparse index");
                    collections.entry(key.to_string()).or_insert_with(|| Collection::new(key)).sparse = Some(idx);
                }
                Err(e) => warn!(file = fname, error = %e, "failed to load sparse index, skipping"),
            }
        } else if let Some(key) = fname.split("_data.").next().filter(|_| fname.contains("_data.")) {
            match load_precomputed_rows(path) {
                Ok(rows) => {
                    let entry = collections.entry(key.to_string()).or_insert_with(|| Collection::new(key));
                    if entry.rows.is_none() {
                        debug!(collection = key, rows = rows.len(), "loaded precomputed document list");
                        entry.rows = Some(rows);
                    }
                }
                Err(e) => warn!(file = fname, error = %e, "failed to load precomputed document list, skipping"),
            }
        } else if fname.ends_with(".tsv") || fname.ends_with(".tsv.gz") {
            let key = fname.trim_end_matches(".gz").trim_end_matches(".tsv");
            match ingest::load_tsv(path) {
                Ok(loaded) => {
                    let entry = collections.entry(key.to_string()).or_insert_with(|| Collection::new(key));
                    if entry.rows.is_none() {
                        debug!(collection = key, rows = loaded.row_count, "loaded TSV fallback");
                        entry.rows = Some(loaded.rows);
                    }
                }
                Err(e) => warn!(file = fname, error = %e, "failed to load TSV, skipping"),
            }
        }
    }
}

fn load_precomputed_rows(path: &Path) -> Result<Vec<RawRow>, lexrag_error::Error> {
    let bytes = std::fs::read(path)
        .map_err(|e| lexrag_error::Error::IndexLoadError(format!("{}: {e}", path.display())))?;
    bincode::deserialize(&bytes)
        .map_err(|e| lexrag_error::Error::IndexLoadError(format!("{}: {e}", path.display())))
}
