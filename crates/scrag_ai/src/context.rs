use std::sync::Arc;

use scrag_core::config::{AppConfig, OracleConfig, OracleProvider, PipelineConfig};
use scrag_core::error::AppError;

use crate::corpus::Corpus;
use crate::llm::{GroqLlm, Llm, OllamaLlm};
use crate::ollama::OllamaClient;
use crate::retrieve::EvidenceSearch;

/// Everything a pipeline needs, built once and handed in. Independent contexts share no
/// state, so several pipelines can run side by side.
#[derive(Clone)]
pub struct AppContext {
    config: PipelineConfig,
    oracle: Arc<dyn Llm>,
    evidence: Arc<dyn EvidenceSearch>,
}

impl AppContext {
    pub fn new(
        config: PipelineConfig,
        oracle: Arc<dyn Llm>,
        evidence: Arc<dyn EvidenceSearch>,
    ) -> Self {
        Self {
            config,
            oracle,
            evidence,
        }
    }

    /// Fails before any query can run when the config is invalid or credentials are missing.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        cfg.validate()?;
        let oracle = build_oracle(&cfg.oracle)?;
        let corpus = Corpus::from_config(cfg)?;
        Ok(Self::new(cfg.pipeline.clone(), oracle, Arc::new(corpus)))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn oracle(&self) -> &dyn Llm {
        self.oracle.as_ref()
    }

    pub fn evidence(&self) -> &dyn EvidenceSearch {
        self.evidence.as_ref()
    }
}

pub fn build_oracle(cfg: &OracleConfig) -> Result<Arc<dyn Llm>, AppError> {
    match cfg.provider {
        OracleProvider::Groq => Ok(Arc::new(GroqLlm::new(cfg)?)),
        OracleProvider::Ollama => {
            let client = OllamaClient::new(&cfg.ollama_url)?;
            Ok(Arc::new(OllamaLlm::new(client, cfg)))
        }
    }
}
