use scrag_core::domain::PipelineResult;

/// Best-so-far accumulator across retry attempts.
///
/// A candidate replaces the current best only when its confidence is strictly higher, so
/// ties keep the earlier attempt.
#[derive(Debug, Clone, Default)]
pub struct BestResult {
    best: Option<PipelineResult>,
    best_score: Option<u32>,
}

impl BestResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `candidate` became the new best.
    pub fn offer(&mut self, candidate: PipelineResult) -> bool {
        if let Some(score) = self.best_score {
            if candidate.confidence <= score {
                return false;
            }
        }
        self.best_score = Some(candidate.confidence);
        self.best = Some(candidate);
        true
    }

    pub fn score(&self) -> Option<u32> {
        self.best_score
    }

    pub fn get(&self) -> Option<&PipelineResult> {
        self.best.as_ref()
    }

    pub fn into_inner(self) -> Option<PipelineResult> {
        self.best
    }
}
