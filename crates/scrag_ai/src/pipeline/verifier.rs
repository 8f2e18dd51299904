use scrag_core::config::PipelineConfig;
use scrag_core::domain::{Answer, FactCheckReport};
use serde::Deserialize;
use tracing::{info, warn};

use super::prompts::{fact_check_prompt, source_context};
use crate::judgment::judge;
use crate::llm::Llm;

#[derive(Debug, Deserialize)]
struct FactCheckReply {
    #[serde(default = "fallback_score")]
    consistency_score: f64,
    #[serde(default)]
    supported_claims: Vec<String>,
    #[serde(default)]
    unsupported_claims: Vec<String>,
    #[serde(default = "completed_verdict")]
    verdict: String,
}

fn fallback_score() -> f64 {
    f64::from(FactCheckReport::FALLBACK_SCORE)
}

fn completed_verdict() -> String {
    "Assessment completed".to_string()
}

/// Cross-check `answer` against the passages it was generated from. Never fails: an
/// unusable reply yields [`FactCheckReport::fallback`].
pub fn verify_answer(
    llm: &dyn Llm,
    cfg: &PipelineConfig,
    question: &str,
    answer: &Answer<'_>,
) -> FactCheckReport {
    let context = source_context(&answer.passages);
    let prompt = fact_check_prompt(&cfg.subject, question, &answer.text, &context);

    let report = judge(
        llm,
        &prompt,
        |reply: FactCheckReply| FactCheckReport {
            consistency_score: reply.consistency_score.clamp(0.0, 100.0).trunc() as u32,
            supported_claims: reply.supported_claims,
            unsupported_claims: reply.unsupported_claims,
            verdict: reply.verdict,
        },
        |err| {
            warn!(error = %err, "fact check failed; defaulting to medium confidence");
            FactCheckReport::fallback()
        },
    );

    info!(
        score = report.consistency_score,
        supported = report.supported_claims.len(),
        unsupported = report.unsupported_claims.len(),
        verdict = %report.verdict,
        "fact check done"
    );
    for claim in report.unsupported_claims.iter() {
        warn!(claim = %claim, "unsupported claim");
    }
    report
}
