use serde::{Deserialize, Serialize};

pub const NO_DOCUMENTS_ANSWER: &str = "No documents found in the knowledge base.";
pub const NO_RELEVANT_DOCS_ANSWER: &str =
    "I couldn't find relevant information to answer this question in the available documents.";

/// A retrieved unit of source text with provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passage {
    pub id: String,
    pub source: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    pub question: String,
    pub max_retries: u32,
}

impl Query {
    pub fn new(question: impl Into<String>, max_retries: u32) -> Self {
        Self {
            question: question.into(),
            max_retries,
        }
    }
}

/// Outcome of one relevance judgment.
///
/// `score` is `None` when the oracle reply could not be obtained or parsed; such passages
/// are always kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelevanceVerdict {
    pub passage_id: String,
    pub score: Option<u8>,
    pub reason: String,
    pub kept: bool,
}

/// Generated answer text plus the exact passages it was conditioned on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer<'a> {
    pub text: String,
    pub passages: Vec<&'a Passage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactCheckReport {
    pub consistency_score: u32,
    pub supported_claims: Vec<String>,
    pub unsupported_claims: Vec<String>,
    pub verdict: String,
}

impl FactCheckReport {
    pub const FALLBACK_SCORE: u32 = 70;
    pub const FALLBACK_VERDICT: &'static str = "Unable to fully verify - proceed with caution";

    /// Report used when the fact check could not be completed. Lands on medium confidence so
    /// the retry policy still runs.
    pub fn fallback() -> Self {
        Self {
            consistency_score: Self::FALLBACK_SCORE,
            supported_claims: Vec::new(),
            unsupported_claims: Vec::new(),
            verdict: Self::FALLBACK_VERDICT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    NoDocuments,
    NoRelevantDocs,
    HighConfidence,
    MediumConfidence,
    LowConfidence,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::NoDocuments => "NO_DOCUMENTS",
            PipelineStatus::NoRelevantDocs => "NO_RELEVANT_DOCS",
            PipelineStatus::HighConfidence => "HIGH_CONFIDENCE",
            PipelineStatus::MediumConfidence => "MEDIUM_CONFIDENCE",
            PipelineStatus::LowConfidence => "LOW_CONFIDENCE",
        }
    }

    pub fn is_short_circuit(&self) -> bool {
        matches!(self, PipelineStatus::NoDocuments | PipelineStatus::NoRelevantDocs)
    }

    pub fn delivery_note(&self) -> &'static str {
        match self {
            PipelineStatus::NoDocuments => "Knowledge base is empty; nothing to answer from",
            PipelineStatus::NoRelevantDocs => "No retrieved passage passed the relevance filter",
            PipelineStatus::HighConfidence => "Answer approved for delivery",
            PipelineStatus::MediumConfidence => "Answer delivered with caution notice",
            PipelineStatus::LowConfidence => "Answer quality below threshold",
        }
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only externally observable output of a pipeline run.
///
/// `confidence` always equals `fact_check_details.consistency_score`; the two
/// short-circuit statuses carry confidence 0 and no report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineResult {
    pub answer: String,
    pub confidence: u32,
    pub status: PipelineStatus,
    pub fact_check_details: Option<FactCheckReport>,
    pub num_sources: usize,
}

impl PipelineResult {
    pub fn no_documents() -> Self {
        Self::short_circuit(PipelineStatus::NoDocuments, NO_DOCUMENTS_ANSWER)
    }

    pub fn no_relevant_docs() -> Self {
        Self::short_circuit(PipelineStatus::NoRelevantDocs, NO_RELEVANT_DOCS_ANSWER)
    }

    fn short_circuit(status: PipelineStatus, answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            confidence: 0,
            status,
            fact_check_details: None,
            num_sources: 0,
        }
    }

    pub fn scored(
        answer: String,
        report: FactCheckReport,
        status: PipelineStatus,
        num_sources: usize,
    ) -> Self {
        Self {
            answer,
            confidence: report.consistency_score,
            status,
            fact_check_details: Some(report),
            num_sources,
        }
    }

    pub fn unsupported_claims(&self) -> &[String] {
        self.fact_check_details
            .as_ref()
            .map(|r| r.unsupported_claims.as_slice())
            .unwrap_or(&[])
    }
}
