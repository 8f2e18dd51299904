use scrag_core::config::PipelineConfig;
use scrag_core::domain::{Passage, RelevanceVerdict};
use serde::Deserialize;
use tracing::{info, warn};

use super::prompts::relevance_prompt;
use crate::judgment::judge;
use crate::llm::Llm;
use crate::text::clipped;

#[derive(Debug, Deserialize)]
struct RelevanceReply {
    // A reply without a score counts as irrelevant.
    #[serde(default)]
    relevance_score: f64,
    #[serde(default = "no_reason")]
    reason: String,
}

fn no_reason() -> String {
    "No reason provided".to_string()
}

/// Passages that survived the filter, in retrieval order, plus one verdict per input.
#[derive(Debug, Clone)]
pub struct Filtered<'a> {
    pub kept: Vec<&'a Passage>,
    pub verdicts: Vec<RelevanceVerdict>,
}

/// One oracle call per passage. Unparsable or failed judgments keep the passage.
pub fn judge_passage(
    llm: &dyn Llm,
    cfg: &PipelineConfig,
    question: &str,
    passage: &Passage,
) -> RelevanceVerdict {
    let excerpt = clipped(&passage.text, cfg.preview_chars);
    let prompt = relevance_prompt(&cfg.subject, question, &excerpt);

    judge(
        llm,
        &prompt,
        |reply: RelevanceReply| {
            // Threshold applies to the raw reply; only the stored score is truncated.
            let raw = reply.relevance_score;
            RelevanceVerdict {
                passage_id: passage.id.clone(),
                score: Some(raw.clamp(0.0, 10.0).trunc() as u8),
                reason: reply.reason,
                kept: cfg.is_relevant(raw),
            }
        },
        |err| {
            warn!(passage = %passage.id, error = %err, "relevance judgment failed; keeping passage");
            RelevanceVerdict {
                passage_id: passage.id.clone(),
                score: None,
                reason: err.to_string(),
                kept: true,
            }
        },
    )
}

pub fn filter_relevant<'a>(
    llm: &dyn Llm,
    cfg: &PipelineConfig,
    question: &str,
    passages: &'a [Passage],
) -> Filtered<'a> {
    let mut kept = Vec::with_capacity(passages.len());
    let mut verdicts = Vec::with_capacity(passages.len());

    for (i, passage) in passages.iter().enumerate() {
        let verdict = judge_passage(llm, cfg, question, passage);
        info!(
            document = i + 1,
            score = ?verdict.score,
            kept = verdict.kept,
            reason = %verdict.reason,
            "relevance verdict"
        );
        if verdict.kept {
            kept.push(passage);
        }
        verdicts.push(verdict);
    }

    info!(kept = kept.len(), total = passages.len(), "relevance filter done");
    Filtered { kept, verdicts }
}
