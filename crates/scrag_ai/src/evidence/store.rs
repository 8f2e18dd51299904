use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use scrag_core::config::ChunkingConfig;
use scrag_core::error::AppError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::chunking::{split_text, ChunkDraft};
use super::model::{EvidenceChunk, EvidenceChunkSummary, EvidenceSource};
use super::persist::{read_json_or_default, write_json_atomic};
use crate::text::normalize_newlines;

const STORE_FAILED: &str = "AI_EVIDENCE_STORE_FAILED";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildChunksResult {
    pub source_count: u32,
    pub chunk_count: u32,
    pub updated_at: String,
}

/// File-backed store of sources and their chunks.
///
/// Layout under `root`: `sources.json`, `chunks_by_source.json`, `chunks/<chunk_id>.json`.
#[derive(Debug, Clone)]
pub struct EvidenceStore {
    root: PathBuf,
}

impl EvidenceStore {
    pub fn open(root: PathBuf) -> Self {
        Self { root }
    }

    fn sources_path(&self) -> PathBuf {
        self.root.join("sources.json")
    }

    fn chunks_dir(&self) -> PathBuf {
        self.root.join("chunks")
    }

    fn chunks_by_source_path(&self) -> PathBuf {
        self.root.join("chunks_by_source.json")
    }

    fn chunk_path(&self, chunk_id: &str) -> PathBuf {
        self.chunks_dir().join(format!("{chunk_id}.json"))
    }

    fn ensure_dirs(&self) -> Result<(), AppError> {
        fs::create_dir_all(self.chunks_dir()).map_err(|e| {
            AppError::at_path(STORE_FAILED, "Failed to create evidence store directories", &self.chunks_dir(), &e)
        })
    }

    fn read_sources(&self) -> Result<Vec<EvidenceSource>, AppError> {
        read_json_or_default(&self.sources_path(), STORE_FAILED, "evidence sources")
    }

    fn read_chunks_by_source(&self) -> Result<BTreeMap<String, Vec<String>>, AppError> {
        read_json_or_default(
            &self.chunks_by_source_path(),
            STORE_FAILED,
            "chunks_by_source mapping",
        )
    }

    /// Register a text file as a source. Re-adding the same path replaces the record.
    pub fn add_file_source(&self, path: &Path, created_at: &str) -> Result<EvidenceSource, AppError> {
        self.ensure_dirs()?;

        if !path.is_file() {
            return Err(AppError::new(
                "AI_EVIDENCE_SOURCE_INVALID",
                "Evidence source must be an existing file",
            )
            .with_details(format!("path={}", path.display())));
        }
        let abs = fs::canonicalize(path).map_err(|e| {
            AppError::at_path("AI_EVIDENCE_SOURCE_INVALID", "Failed to resolve evidence path", path, &e)
        })?;
        let abs_str = abs.to_string_lossy().to_string();
        let source_id = sha256_hex(format!("file|{abs_str}").as_bytes());
        let label = abs
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| abs_str.clone());

        let source = EvidenceSource {
            source_id: source_id.clone(),
            label,
            path: abs_str,
            created_at: created_at.to_string(),
        };

        let mut records = self.read_sources()?;
        records.retain(|r| r.source_id != source_id);
        records.push(source.clone());
        // Stable ordering for deterministic lists.
        records.sort_by(|a, b| a.source_id.cmp(&b.source_id));
        write_json_atomic(&self.sources_path(), &records, STORE_FAILED, "evidence sources")?;

        Ok(source)
    }

    pub fn list_sources(&self) -> Result<Vec<EvidenceSource>, AppError> {
        self.ensure_dirs()?;
        self.read_sources()
    }

    pub fn get_chunk(&self, chunk_id: &str) -> Result<EvidenceChunk, AppError> {
        let path = self.chunk_path(chunk_id);
        let raw = fs::read_to_string(&path).map_err(|e| {
            AppError::new("AI_EVIDENCE_NOT_FOUND", "Evidence chunk not found")
                .with_details(format!("id={chunk_id}; err={e}"))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::at_path(STORE_FAILED, "Failed to decode evidence chunk", &path, &e)
        })
    }

    fn write_chunk(&self, chunk: &EvidenceChunk) -> Result<(), AppError> {
        let path = self.chunk_path(&chunk.chunk_id);
        let json = serde_json::to_string_pretty(chunk).map_err(|e| {
            AppError::new(STORE_FAILED, "Failed to encode evidence chunk").with_details(e.to_string())
        })?;
        // Content-derived ids make overwrites idempotent.
        fs::write(&path, json.as_bytes()).map_err(|e| {
            AppError::at_path(STORE_FAILED, "Failed to write evidence chunk", &path, &e)
        })
    }

    fn delete_chunks(&self, chunk_ids: &[String]) -> Result<(), AppError> {
        for id in chunk_ids {
            let path = self.chunk_path(id);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    AppError::at_path(STORE_FAILED, "Failed to delete chunk file", &path, &e)
                })?;
            }
        }
        Ok(())
    }

    /// Re-chunk the given sources (all sources when `None`), replacing their old chunks.
    pub fn build_chunks(
        &self,
        source_ids: Option<&[String]>,
        chunking: &ChunkingConfig,
        updated_at: &str,
    ) -> Result<BuildChunksResult, AppError> {
        self.ensure_dirs()?;

        let all = self.read_sources()?;
        let sources: Vec<EvidenceSource> = match source_ids {
            Some(ids) => {
                let mut picked = Vec::with_capacity(ids.len());
                for id in ids {
                    let rec = all.iter().find(|s| &s.source_id == id).ok_or_else(|| {
                        AppError::new("AI_EVIDENCE_SOURCE_INVALID", "Evidence source not found")
                            .with_details(format!("source_id={id}"))
                    })?;
                    picked.push(rec.clone());
                }
                picked
            }
            None => all,
        };
        if sources.is_empty() {
            return Err(AppError::new("AI_EVIDENCE_EMPTY", "No evidence sources available"));
        }

        let mut chunks_by_source = self.read_chunks_by_source()?;
        let mut total: u32 = 0;

        for source in sources.iter() {
            // Drop old chunks first so edits never leave stale text behind.
            if let Some(old) = chunks_by_source.get(&source.source_id) {
                self.delete_chunks(old)?;
            }

            let text = read_source_text(source)?;
            let mut chunk_ids = Vec::new();
            for draft in split_text(&text, chunking) {
                let chunk = chunk_from_draft(source, draft);
                self.write_chunk(&chunk)?;
                chunk_ids.push(chunk.chunk_id);
                total += 1;
            }
            chunks_by_source.insert(source.source_id.clone(), chunk_ids);
        }

        write_json_atomic(
            &self.chunks_by_source_path(),
            &chunks_by_source,
            STORE_FAILED,
            "chunks_by_source mapping",
        )?;

        Ok(BuildChunksResult {
            source_count: sources.len() as u32,
            chunk_count: total,
            updated_at: updated_at.to_string(),
        })
    }

    pub fn list_chunks(&self, source_id: Option<&str>) -> Result<Vec<EvidenceChunkSummary>, AppError> {
        self.ensure_dirs()?;
        let map = self.read_chunks_by_source()?;

        let mut out: Vec<EvidenceChunkSummary> = Vec::new();
        for (sid, ids) in map.iter() {
            if source_id.is_some_and(|wanted| wanted != sid.as_str()) {
                continue;
            }
            for cid in ids {
                let chunk = self.get_chunk(cid)?;
                out.push(EvidenceChunkSummary::from(&chunk));
            }
        }

        // Stable ordering: source_id asc, ordinal asc, chunk_id asc.
        out.sort_by(|a, b| {
            a.source_id
                .cmp(&b.source_id)
                .then(a.ordinal.cmp(&b.ordinal))
                .then(a.chunk_id.cmp(&b.chunk_id))
        });
        Ok(out)
    }
}

fn read_source_text(source: &EvidenceSource) -> Result<String, AppError> {
    let path = Path::new(&source.path);
    fs::read_to_string(path)
        .map_err(|e| AppError::at_path("AI_EVIDENCE_SOURCE_INVALID", "Failed to read evidence file", path, &e))
}

fn chunk_from_draft(source: &EvidenceSource, d: ChunkDraft) -> EvidenceChunk {
    let text = normalize_newlines(&d.text);
    let text_sha256 = sha256_hex(text.as_bytes());
    let chunk_id = sha256_hex(format!("v1|{}|{}|{}", source.source_id, d.ordinal, text_sha256).as_bytes());
    let char_count = text.chars().count().min(u32::MAX as usize) as u32;

    EvidenceChunk {
        chunk_id,
        source_id: source.source_id.clone(),
        source_label: source.label.clone(),
        ordinal: d.ordinal,
        text,
        text_sha256,
        char_count,
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
