use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

use scrag_core::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::persist::{read_json_or_default, write_json_atomic};
use super::store::EvidenceStore;
use crate::embeddings::Embedder;

const INDEX_FAILED: &str = "AI_INDEX_BUILD_FAILED";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStatus {
    pub ready: bool,
    pub model: Option<String>,
    pub dims: Option<u32>,
    pub chunk_count: u32,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexBuildInput {
    pub model: String,
    pub updated_at: String,
}

/// Embedding vectors for every chunk in an [`EvidenceStore`], kept next to it on disk.
#[derive(Debug, Clone)]
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    pub fn open(root: PathBuf) -> Self {
        Self { root }
    }

    fn index_dir(&self) -> PathBuf {
        self.root.join("index")
    }

    fn status_path(&self) -> PathBuf {
        self.index_dir().join("index_status.json")
    }

    fn vectors_path(&self) -> PathBuf {
        self.index_dir().join("index_vectors.json")
    }

    fn hashes_path(&self) -> PathBuf {
        self.index_dir().join("index_hashes.json")
    }

    fn ensure_dirs(&self) -> Result<(), AppError> {
        fs::create_dir_all(self.index_dir()).map_err(|e| {
            AppError::at_path(INDEX_FAILED, "Failed to create index directory", &self.index_dir(), &e)
        })
    }

    /// Not-ready status when nothing was ever built.
    pub fn status(&self) -> Result<IndexStatus, AppError> {
        read_json_or_default(&self.status_path(), INDEX_FAILED, "index status")
    }

    pub fn read_vectors(&self) -> Result<BTreeMap<String, Vec<f32>>, AppError> {
        read_json_or_default(&self.vectors_path(), INDEX_FAILED, "index vectors")
    }

    pub fn read_hashes(&self) -> Result<BTreeMap<String, String>, AppError> {
        read_json_or_default(&self.hashes_path(), INDEX_FAILED, "index hashes")
    }

    /// Embed every chunk whose text changed since the last build with the same model.
    pub fn build_with_embedder(
        &self,
        evidence: &EvidenceStore,
        embedder: &dyn Embedder,
        input: IndexBuildInput,
    ) -> Result<IndexStatus, AppError> {
        self.ensure_dirs()?;

        let summaries = evidence.list_chunks(None)?;
        if summaries.is_empty() {
            return Err(AppError::new(
                "AI_INDEX_NOT_READY",
                "No chunks available; build chunks before building the index",
            ));
        }

        let current = self.status()?;
        let compatible = current.ready && current.model.as_deref() == Some(input.model.as_str());

        let mut vectors = if compatible { self.read_vectors()? } else { BTreeMap::new() };
        let mut hashes = if compatible { self.read_hashes()? } else { BTreeMap::new() };

        // Forget chunks that no longer exist.
        let wanted: BTreeSet<&str> = summaries.iter().map(|s| s.chunk_id.as_str()).collect();
        vectors.retain(|k, _| wanted.contains(k.as_str()));
        hashes.retain(|k, _| wanted.contains(k.as_str()));

        let mut to_embed: Vec<&str> = summaries
            .iter()
            .filter(|s| {
                hashes.get(&s.chunk_id) != Some(&s.text_sha256) || !vectors.contains_key(&s.chunk_id)
            })
            .map(|s| s.chunk_id.as_str())
            .collect();
        to_embed.sort();
        to_embed.dedup();
        debug!(total = summaries.len(), changed = to_embed.len(), "index build");

        let mut dims: Option<u32> = if compatible { current.dims } else { None };
        for chunk_id in to_embed {
            let chunk = evidence.get_chunk(chunk_id)?;
            let v = embedder.embed(&input.model, &chunk.text).map_err(|e| {
                AppError::new("AI_EMBEDDINGS_FAILED", "Failed to compute embeddings")
                    .with_details(format!("chunk_id={}; err={}", chunk_id, e))
                    .with_retryable(e.retryable)
            })?;
            let this_dims = v.len() as u32;
            match dims {
                Some(d) if d != this_dims => {
                    return Err(AppError::new(
                        INDEX_FAILED,
                        "Embedding dimension mismatch across chunks",
                    )
                    .with_details(format!("expected={d}; got={this_dims}; chunk_id={chunk_id}")));
                }
                Some(_) => {}
                None => dims = Some(this_dims),
            }
            vectors.insert(chunk_id.to_string(), v);
        }

        for s in summaries.iter() {
            hashes.insert(s.chunk_id.clone(), s.text_sha256.clone());
        }

        // Status goes last so a failed build never looks ready.
        write_json_atomic(&self.vectors_path(), &vectors, INDEX_FAILED, "index vectors")?;
        write_json_atomic(&self.hashes_path(), &hashes, INDEX_FAILED, "index hashes")?;

        let status = IndexStatus {
            ready: true,
            model: Some(input.model),
            dims,
            chunk_count: vectors.len() as u32,
            updated_at: Some(input.updated_at),
        };
        write_json_atomic(&self.status_path(), &status, INDEX_FAILED, "index status")?;
        Ok(status)
    }
}
