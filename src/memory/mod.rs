//! Similarity-indexed append-only store of past exchanges.
//!
//! Records are immutable once written: created at the end of a successful
//! turn, never updated, never deleted except by capacity eviction. The store
//! is internally synchronized so multiple sessions can query and append
//! concurrently.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One stored exchange: a serialized "User: ...\nAI: ..." text plus its
/// embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Vector memory store.
///
/// In-memory index with optional JSONL persistence: each `add` appends one
/// line to the persistence file (best effort — IO failures are logged and do
/// not fail the append).
pub struct VectorMemory {
    records: RwLock<Vec<MemoryRecord>>,
    path: Option<PathBuf>,
    max_records: usize,
}

impl VectorMemory {
    /// Create an empty, purely in-memory store.
    pub fn new(max_records: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            path: None,
            max_records,
        }
    }

    /// Create a store backed by a JSONL file, loading any existing records.
    ///
    /// Unparseable lines are skipped with a warning; a missing file starts
    /// the store empty.
    pub fn with_persistence(path: &Path, max_records: usize) -> Self {
        let mut records = Vec::new();
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => {
                    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
                        match serde_json::from_str::<MemoryRecord>(line) {
                            Ok(r) => records.push(r),
                            Err(e) => warn!("Skipping corrupt memory record: {}", e),
                        }
                    }
                }
                Err(e) => warn!("Failed to read memory file {}: {}", path.display(), e),
            }
        }
        // Respect the capacity bound on load as well.
        if records.len() > max_records {
            let excess = records.len() - max_records;
            records.drain(..excess);
        }

        Self {
            records: RwLock::new(records),
            path: Some(path.to_path_buf()),
            max_records,
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// True if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the raw texts of the `k` records most similar to `embedding`,
    /// ranked by descending cosine similarity.
    ///
    /// Returns an empty list when the store is empty or the query vector's
    /// dimensionality does not match the index. Never fails.
    pub fn query(&self, embedding: &[f32], k: usize) -> Vec<String> {
        let records = match self.records.read() {
            Ok(r) => r,
            Err(_) => return Vec::new(),
        };

        let mut scored: Vec<(f32, &MemoryRecord)> = records
            .iter()
            .filter(|r| r.embedding.len() == embedding.len())
            .map(|r| (cosine_similarity(&r.embedding, embedding), r))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(_, r)| r.text.clone())
            .collect()
    }

    /// Append one immutable record.
    ///
    /// Rejects a duplicate id and an embedding whose dimensionality differs
    /// from the records already in the store. When the capacity bound is
    /// reached the oldest record is evicted.
    pub fn add(&self, text: &str, embedding: Vec<f32>, id: &str) -> Result<()> {
        if embedding.is_empty() {
            bail!("Refusing to store an empty embedding");
        }

        let mut records = match self.records.write() {
            Ok(r) => r,
            Err(_) => bail!("Memory index lock poisoned"),
        };

        if let Some(first) = records.first() {
            if first.embedding.len() != embedding.len() {
                bail!(
                    "Embedding dimensionality mismatch: store has {}, got {}",
                    first.embedding.len(),
                    embedding.len()
                );
            }
        }

        if records.iter().any(|r| r.id == id) {
            bail!("Duplicate memory record id: {}", id);
        }

        let record = MemoryRecord {
            id: id.to_string(),
            text: text.to_string(),
            embedding,
        };

        if records.len() >= self.max_records && !records.is_empty() {
            records.remove(0);
        }
        records.push(record.clone());
        drop(records);

        self.persist(&record);
        Ok(())
    }

    /// Append a record to the persistence file, if one is configured.
    /// Best effort; failures are logged and swallowed.
    fn persist(&self, record: &MemoryRecord) {
        let Some(ref path) = self.path else {
            return;
        };

        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let line = match serde_json::to_string(record) {
            Ok(l) => l,
            Err(e) => {
                warn!("Failed to serialize memory record: {}", e);
                return;
            }
        };

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut f| writeln!(f, "{}", line));

        if let Err(e) = result {
            warn!("Failed to persist memory record to {}: {}", path.display(), e);
        }
    }
}

/// Cosine similarity of two equal-length vectors. Zero for degenerate input.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
