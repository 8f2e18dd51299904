#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use scrag_ai::context::AppContext;
use scrag_ai::embeddings::Embedder;
use scrag_ai::llm::Llm;
use scrag_ai::retrieve::EvidenceSearch;
use scrag_core::config::PipelineConfig;
use scrag_core::domain::Passage;
use scrag_core::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Relevance,
    Answer,
    FactCheck,
}

pub fn kind_of(prompt: &str) -> Kind {
    if prompt.starts_with("You are a document relevance evaluator") {
        Kind::Relevance
    } else if prompt.starts_with("You are a fact-checking expert") {
        Kind::FactCheck
    } else {
        Kind::Answer
    }
}

type Reply = Result<String, AppError>;
type RelevanceFn = Box<dyn Fn(&str) -> Reply + Send + Sync>;

/// Oracle double that answers by prompt kind and records every prompt it saw.
///
/// Answers and fact checks are consumed in order; once a queue runs dry the default reply is
/// used. Relevance replies come from a closure over the prompt so tests can key on excerpt
/// text.
pub struct ScriptedLlm {
    relevance: RelevanceFn,
    answers: Mutex<VecDeque<Reply>>,
    fact_checks: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<(Kind, String)>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            relevance: Box::new(|_| Ok(relevance_json(9))),
            answers: Mutex::new(VecDeque::new()),
            fact_checks: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn relevance_with(mut self, f: impl Fn(&str) -> Reply + Send + Sync + 'static) -> Self {
        self.relevance = Box::new(f);
        self
    }

    pub fn answers(self, replies: Vec<Reply>) -> Self {
        *self.answers.lock().unwrap() = replies.into();
        self
    }

    pub fn fact_scores(self, scores: &[u32]) -> Self {
        *self.fact_checks.lock().unwrap() = scores.iter().map(|s| Ok(fact_check_json(*s))).collect();
        self
    }

    pub fn fact_checks(self, replies: Vec<Reply>) -> Self {
        *self.fact_checks.lock().unwrap() = replies.into();
        self
    }

    pub fn calls(&self, kind: Kind) -> usize {
        self.prompts.lock().unwrap().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn prompts(&self, kind: Kind) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl Llm for ScriptedLlm {
    fn invoke(&self, prompt: &str) -> Result<String, AppError> {
        let kind = kind_of(prompt);
        self.prompts.lock().unwrap().push((kind, prompt.to_string()));
        match kind {
            Kind::Relevance => (self.relevance)(prompt),
            Kind::Answer => {
                let n = self.calls(Kind::Answer);
                self.answers
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Ok(format!("Answer {n} per [Source 1].")))
            }
            Kind::FactCheck => self
                .fact_checks
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(fact_check_json(95))),
        }
    }
}

pub fn relevance_json(score: u32) -> String {
    format!(r#"{{"relevance_score": {score}, "reason": "scripted"}}"#)
}

pub fn fact_check_json(score: u32) -> String {
    format!(
        r#"{{"consistency_score": {score}, "supported_claims": ["a"], "unsupported_claims": ["b"], "verdict": "scripted {score}"}}"#
    )
}

pub fn oracle_down() -> AppError {
    AppError::new("AI_ORACLE_UNREACHABLE", "oracle unavailable").with_retryable(true)
}

pub fn passage(id: &str, text: &str) -> Passage {
    Passage {
        id: id.to_string(),
        source: format!("{id}.txt"),
        text: text.to_string(),
    }
}

/// Evidence double: the i-th search returns the i-th scripted list, the last one repeating.
pub struct StaticEvidence {
    rounds: Vec<Vec<Passage>>,
    calls: AtomicUsize,
    last_k: AtomicUsize,
}

impl StaticEvidence {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self::rounds(vec![passages])
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn rounds(rounds: Vec<Vec<Passage>>) -> Self {
        Self {
            rounds,
            calls: AtomicUsize::new(0),
            last_k: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_k(&self) -> usize {
        self.last_k.load(Ordering::SeqCst)
    }
}

impl EvidenceSearch for StaticEvidence {
    fn search(&self, _query: &str, k: usize) -> Result<Vec<Passage>, AppError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_k.store(k, Ordering::SeqCst);
        let round = self
            .rounds
            .get(n)
            .or_else(|| self.rounds.last())
            .cloned()
            .unwrap_or_default();
        Ok(round.into_iter().take(k).collect())
    }
}

/// Evidence double whose store is unreachable.
pub struct FailingEvidence;

impl EvidenceSearch for FailingEvidence {
    fn search(&self, _query: &str, _k: usize) -> Result<Vec<Passage>, AppError> {
        Err(AppError::new("AI_EMBEDDINGS_FAILED", "embedding server unreachable").with_retryable(true))
    }
}

pub fn context(llm: &Arc<ScriptedLlm>, evidence: &Arc<StaticEvidence>) -> AppContext {
    AppContext::new(PipelineConfig::default(), llm.clone(), evidence.clone())
}

/// Deterministic 2-d embedding: counts of 'a' and 'b'.
pub struct CountingEmbedder {
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for CountingEmbedder {
    fn embed(&self, _model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let a = input.chars().filter(|c| *c == 'a').count();
        let b = input.chars().filter(|c| *c == 'b').count();
        Ok(vec![a as f32, b as f32])
    }
}
