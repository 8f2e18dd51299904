//! The self-correcting query pipeline: retrieve, filter, generate, verify, decide.

use scrag_core::domain::{PipelineResult, PipelineStatus, Query};
use scrag_core::error::AppError;
use tracing::{debug, info, info_span, warn};

use crate::context::AppContext;

pub mod best;
pub mod generator;
pub mod prompts;
pub mod relevance;
pub mod verifier;

pub use best::BestResult;
pub use generator::generate_answer;
pub use relevance::{filter_relevant, judge_passage, Filtered};
pub use verifier::verify_answer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Retrieving,
    Filtering,
    Generating,
    Verifying,
    Deciding,
}

/// What the controller does after a scored attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Good enough; stop regardless of remaining budget.
    Accept,
    /// Keep as a candidate and try again if budget remains.
    Retry,
}

pub fn decide(status: PipelineStatus) -> Decision {
    match status {
        PipelineStatus::HighConfidence => Decision::Accept,
        _ => Decision::Retry,
    }
}

pub struct Pipeline {
    ctx: AppContext,
}

impl Pipeline {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    pub fn run(&self, query: &Query) -> Result<PipelineResult, AppError> {
        self.query(&query.question, query.max_retries)
    }

    /// Answer `question`, running up to `max_retries + 1` full attempts and returning the
    /// best one. A NO_DOCUMENTS or NO_RELEVANT_DOCS outcome ends the query at once. Only an
    /// oracle failure during answer generation (or a broken evidence store) surfaces as an
    /// error.
    pub fn query(&self, question: &str, max_retries: u32) -> Result<PipelineResult, AppError> {
        info!(question, max_retries, "pipeline start");
        let mut best = BestResult::new();

        for attempt in 0..=max_retries {
            let _span = info_span!("attempt", attempt).entered();
            if attempt > 0 {
                info!(attempt, max_retries, "retry attempt");
            }

            let result = self.attempt(question)?;
            // Terminal on any attempt, even when an earlier one was scored.
            if result.status.is_short_circuit() {
                if best.score().is_some() {
                    warn!(status = %result.status, attempt, "retry found no usable evidence; discarding earlier answers");
                }
                return Ok(result);
            }

            debug!(stage = ?Stage::Deciding, status = %result.status, score = result.confidence);
            let decision = decide(result.status);
            best.offer(result);
            if decision == Decision::Accept {
                break;
            }
        }

        let result = best
            .into_inner()
            .ok_or_else(|| AppError::new("PIPELINE_NO_RESULT", "Pipeline finished without a result"))?;
        info!(
            status = %result.status,
            confidence = result.confidence,
            sources = result.num_sources,
            note = result.status.delivery_note(),
            "final decision"
        );
        Ok(result)
    }

    /// One full retrieve → filter → generate → verify cycle.
    pub fn attempt(&self, question: &str) -> Result<PipelineResult, AppError> {
        let cfg = self.ctx.config();
        let oracle = self.ctx.oracle();

        debug!(stage = ?Stage::Retrieving, k = cfg.top_k);
        let passages = self.ctx.evidence().search(question, cfg.top_k)?;
        if passages.is_empty() {
            warn!("no documents retrieved");
            return Ok(PipelineResult::no_documents());
        }
        info!(retrieved = passages.len(), "retrieval done");

        debug!(stage = ?Stage::Filtering);
        let filtered = filter_relevant(oracle, cfg, question, &passages);
        if filtered.kept.is_empty() {
            warn!(retrieved = passages.len(), "no passage passed the relevance filter");
            return Ok(PipelineResult::no_relevant_docs());
        }

        debug!(stage = ?Stage::Generating, sources = filtered.kept.len());
        let answer = generate_answer(oracle, cfg, question, &filtered.kept)?;

        debug!(stage = ?Stage::Verifying);
        let report = verify_answer(oracle, cfg, question, &answer);

        let status = cfg.classify(report.consistency_score);
        Ok(PipelineResult::scored(answer.text, report, status, filtered.kept.len()))
    }
}
