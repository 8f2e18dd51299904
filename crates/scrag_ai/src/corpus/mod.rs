use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use scrag_core::config::{AppConfig, ChunkingConfig};
use scrag_core::domain::Passage;
use scrag_core::error::AppError;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::embeddings::{Embedder, OllamaEmbedder};
use crate::evidence::{EvidenceStore, IndexBuildInput, IndexStatus, IndexStore};
use crate::ollama::OllamaClient;
use crate::retrieve::{search_with_embedder, EvidenceSearch};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

/// The document corpus: evidence store, embedding index and the embedder that feeds both.
///
/// `load` populates it; afterwards it answers [`EvidenceSearch`] queries.
#[derive(Clone)]
pub struct Corpus {
    evidence: EvidenceStore,
    index: IndexStore,
    embedder: Arc<dyn Embedder>,
    embed_model: String,
    chunking: ChunkingConfig,
}

impl Corpus {
    pub fn open(
        root: PathBuf,
        embedder: Arc<dyn Embedder>,
        embed_model: impl Into<String>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            evidence: EvidenceStore::open(root.clone()),
            index: IndexStore::open(root),
            embedder,
            embed_model: embed_model.into(),
            chunking,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        let client = OllamaClient::new(&cfg.embeddings.ollama_url)?;
        let embedder = OllamaEmbedder::new(client, Duration::from_secs(cfg.embeddings.timeout_secs));
        Ok(Self::open(
            cfg.evidence_dir(),
            Arc::new(embedder),
            cfg.embeddings.model.clone(),
            cfg.chunking.clone(),
        ))
    }

    pub fn evidence(&self) -> &EvidenceStore {
        &self.evidence
    }

    pub fn status(&self) -> Result<IndexStatus, AppError> {
        self.index.status()
    }

    /// Ingest files (directories are expanded one level) and rebuild the index.
    ///
    /// Returns the number of chunks produced for the given files; 0 when none of the paths
    /// held a supported document.
    pub fn load(&self, file_paths: &[PathBuf]) -> Result<u32, AppError> {
        let files = collect_corpus_files(file_paths)?;
        if files.is_empty() {
            warn!("no supported documents found; add .txt or .md files");
            return Ok(0);
        }

        let now = now_rfc3339_utc()?;
        let mut source_ids = Vec::with_capacity(files.len());
        for f in files.iter() {
            let source = self.evidence.add_file_source(f, &now)?;
            info!(source = %source.label, "loaded document");
            source_ids.push(source.source_id);
        }

        let built = self.evidence.build_chunks(Some(source_ids.as_slice()), &self.chunking, &now)?;
        if built.chunk_count == 0 {
            warn!(documents = files.len(), "documents held no text");
            return Ok(0);
        }

        let status = self.index.build_with_embedder(
            &self.evidence,
            self.embedder.as_ref(),
            IndexBuildInput {
                model: self.embed_model.clone(),
                updated_at: now,
            },
        )?;
        info!(
            chunks = built.chunk_count,
            documents = files.len(),
            indexed = status.chunk_count,
            "indexed document chunks"
        );
        Ok(built.chunk_count)
    }
}

impl EvidenceSearch for Corpus {
    fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, AppError> {
        search_with_embedder(&self.evidence, &self.index, self.embedder.as_ref(), query, k)
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
        .unwrap_or(false)
}

/// Expand the given paths into a sorted, de-duplicated list of supported files.
pub fn collect_corpus_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, AppError> {
    let mut out = Vec::new();
    for p in paths {
        if p.is_dir() {
            let entries = fs::read_dir(p).map_err(|e| {
                AppError::at_path("AI_EVIDENCE_SOURCE_INVALID", "Failed to list evidence directory", &p, &e)
            })?;
            for ent in entries.flatten() {
                let path = ent.path();
                if path.is_file() && is_supported(&path) {
                    out.push(path);
                }
            }
        } else if !p.exists() {
            return Err(AppError::new(
                "AI_EVIDENCE_SOURCE_INVALID",
                "Evidence path does not exist",
            )
            .with_details(format!("path={}", p.display())));
        } else if is_supported(p) {
            out.push(p.clone());
        } else {
            warn!(path = %p.display(), "skipping unsupported document type");
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

pub fn now_rfc3339_utc() -> Result<String, AppError> {
    OffsetDateTime::now_utc().format(&Rfc3339).map_err(|e| {
        AppError::new("AI_CLOCK_FAILED", "Failed to format time").with_details(e.to_string())
    })
}
