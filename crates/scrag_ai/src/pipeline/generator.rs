use scrag_core::config::PipelineConfig;
use scrag_core::domain::{Answer, Passage};
use scrag_core::error::AppError;
use tracing::{info, warn};

use super::prompts::{answer_prompt, source_context};
use crate::guardrails::check_source_citations;
use crate::llm::Llm;
use crate::text::clipped;

/// Ask the oracle for an answer grounded in `relevant`. Oracle errors are returned as-is;
/// there is no sensible default answer.
pub fn generate_answer<'a>(
    llm: &dyn Llm,
    cfg: &PipelineConfig,
    question: &str,
    relevant: &[&'a Passage],
) -> Result<Answer<'a>, AppError> {
    if relevant.is_empty() {
        return Err(AppError::new(
            "PIPELINE_NO_EVIDENCE",
            "Answer generation needs at least one relevant passage",
        ));
    }

    let context = source_context(relevant);
    let prompt = answer_prompt(&cfg.subject, question, &context);
    let text = llm.invoke(&prompt)?;

    let citations = check_source_citations(&text, relevant.len());
    if citations.cited.is_empty() {
        warn!("answer cites no [Source N] label");
    }
    if !citations.out_of_range.is_empty() {
        warn!(labels = ?citations.out_of_range, sources = relevant.len(), "answer cites unknown sources");
    }
    info!(chars = text.chars().count(), preview = %clipped(&text, 150), "generated answer");

    Ok(Answer {
        text,
        passages: relevant.to_vec(),
    })
}
