use scrag_core::domain::Passage;
use scrag_core::error::AppError;

use crate::embeddings::Embedder;
use crate::evidence::{EvidenceStore, IndexStore};

mod similarity;

/// Read-only passage lookup consumed by the pipeline.
///
/// Implementations return an empty list, not an error, when there is no index yet or
/// nothing matches.
pub trait EvidenceSearch: Send + Sync {
    fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, AppError>;
}

/// Cosine-ranked passages for `query`, best first, ties broken by chunk id.
pub fn search_with_embedder(
    evidence: &EvidenceStore,
    index: &IndexStore,
    embedder: &dyn Embedder,
    query: &str,
    k: usize,
) -> Result<Vec<Passage>, AppError> {
    let q = query.trim();
    if q.is_empty() || k == 0 {
        return Ok(Vec::new());
    }

    let st = index.status()?;
    if !st.ready {
        return Ok(Vec::new());
    }
    let model = st
        .model
        .clone()
        .ok_or_else(|| AppError::new("AI_INDEX_NOT_READY", "Index status missing model"))?;
    let dims = st
        .dims
        .ok_or_else(|| AppError::new("AI_INDEX_NOT_READY", "Index status missing dims"))?;

    let vectors = index.read_vectors()?;
    if vectors.is_empty() {
        return Ok(Vec::new());
    }

    let qv = embedder.embed(&model, q)?;
    if qv.len() as u32 != dims {
        return Err(AppError::new(
            "AI_RETRIEVAL_FAILED",
            "Query embedding dims do not match index dims",
        )
        .with_details(format!("index_dims={dims}; query_dims={}", qv.len())));
    }
    let qnorm = similarity::l2_norm(&qv);
    if qnorm == 0.0 {
        return Ok(Vec::new());
    }

    let mut hits: Vec<(&str, f32)> = Vec::with_capacity(vectors.len());
    for (chunk_id, v) in vectors.iter() {
        if v.len() as u32 != dims {
            return Err(AppError::new("AI_RETRIEVAL_FAILED", "Index vector dims mismatch")
                .with_details(format!("chunk_id={chunk_id}; expected={dims}; got={}", v.len())));
        }
        let vnorm = similarity::l2_norm(v);
        if vnorm == 0.0 {
            continue;
        }
        hits.push((chunk_id.as_str(), similarity::cosine_similarity(&qv, v, qnorm, vnorm)));
    }

    hits.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(b.0))
    });
    hits.truncate(k);

    let mut out = Vec::with_capacity(hits.len());
    for (chunk_id, _) in hits {
        let chunk = evidence.get_chunk(chunk_id)?;
        out.push(Passage {
            id: chunk.chunk_id,
            source: chunk.source_label,
            text: chunk.text,
        });
    }
    Ok(out)
}
