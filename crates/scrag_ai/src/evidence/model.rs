use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceSource {
    pub source_id: String,
    /// File name shown to the oracle and the user.
    pub label: String,
    /// Absolute path of the file the text is read from.
    pub path: String,
    pub created_at: String, // RFC3339
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceChunk {
    pub chunk_id: String,
    pub source_id: String,
    pub source_label: String,
    pub ordinal: u32,
    pub text: String,
    pub text_sha256: String,
    pub char_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceChunkSummary {
    pub chunk_id: String,
    pub source_id: String,
    pub source_label: String,
    pub ordinal: u32,
    pub text_sha256: String,
    pub char_count: u32,
}

impl From<&EvidenceChunk> for EvidenceChunkSummary {
    fn from(c: &EvidenceChunk) -> Self {
        Self {
            chunk_id: c.chunk_id.clone(),
            source_id: c.source_id.clone(),
            source_label: c.source_label.clone(),
            ordinal: c.ordinal,
            text_sha256: c.text_sha256.clone(),
            char_count: c.char_count,
        }
    }
}
