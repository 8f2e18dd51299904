use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::PipelineStatus;
use crate::error::AppError;

pub const ENV_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_DATA_DIR: &str = "SCRAG_DATA_DIR";
pub const ENV_ORACLE_PROVIDER: &str = "SCRAG_ORACLE_PROVIDER";
pub const ENV_ORACLE_MODEL: &str = "SCRAG_ORACLE_MODEL";
pub const ENV_OLLAMA_URL: &str = "SCRAG_OLLAMA_URL";
pub const ENV_EMBED_MODEL: &str = "SCRAG_EMBED_MODEL";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OracleProvider {
    /// OpenAI-compatible chat completions endpoint (Groq by default).
    Groq,
    /// Local Ollama generate endpoint.
    Ollama,
}

impl OracleProvider {
    fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(OracleProvider::Groq),
            "ollama" => Ok(OracleProvider::Ollama),
            other => Err(AppError::new(
                "CONFIG_INVALID",
                "Oracle provider must be groq or ollama",
            )
            .with_details(format!("provider={other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OracleConfig {
    pub provider: OracleProvider,
    pub model: String,
    pub base_url: String,
    pub ollama_url: String,
    // Never written back out; comes from the environment or the config file only.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: OracleProvider::Groq,
            model: "llama-3.3-70b-versatile".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            ollama_url: "http://127.0.0.1:11434".to_string(),
            api_key: None,
            temperature: 0.0,
            max_tokens: 1000,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub ollama_url: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-minilm".to_string(),
            ollama_url: "http://127.0.0.1:11434".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Knobs of the query pipeline. Defaults are the values the pipeline was tuned with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    pub top_k: usize,
    pub default_max_retries: u32,
    /// Minimum relevance score (of 10) for a passage to reach generation. Inclusive.
    pub relevance_threshold: u8,
    pub high_confidence: u32,
    pub medium_confidence: u32,
    pub preview_chars: usize,
    /// Domain phrase used in the oracle prompts.
    pub subject: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            default_max_retries: 1,
            relevance_threshold: 7,
            high_confidence: 90,
            medium_confidence: 70,
            preview_chars: 500,
            subject: "AI compliance, ethics, and governance".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Inclusive threshold over the oracle's raw score, so 6.5 misses a threshold of 7.
    pub fn is_relevant(&self, score: f64) -> bool {
        score >= f64::from(self.relevance_threshold)
    }

    pub fn classify(&self, consistency_score: u32) -> PipelineStatus {
        if consistency_score >= self.high_confidence {
            PipelineStatus::HighConfidence
        } else if consistency_score >= self.medium_confidence {
            PipelineStatus::MediumConfidence
        } else {
            PipelineStatus::LowConfidence
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.top_k == 0 {
            return Err(AppError::new("CONFIG_INVALID", "pipeline.top_k must be at least 1"));
        }
        if self.relevance_threshold > 10 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "pipeline.relevance_threshold must be within 0..=10",
            )
            .with_details(format!("relevance_threshold={}", self.relevance_threshold)));
        }
        if self.high_confidence > 100 || self.medium_confidence > self.high_confidence {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Confidence thresholds must satisfy medium <= high <= 100",
            )
            .with_details(format!(
                "medium={}; high={}",
                self.medium_confidence, self.high_confidence
            )));
        }
        if self.preview_chars == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "pipeline.preview_chars must be at least 1",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub oracle: OracleConfig,
    pub embeddings: EmbeddingConfig,
    pub pipeline: PipelineConfig,
    pub chunking: ChunkingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./scrag_data"),
            oracle: OracleConfig::default(),
            embeddings: EmbeddingConfig::default(),
            pipeline: PipelineConfig::default(),
            chunking: ChunkingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the optional JSON file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::at_path("CONFIG_READ_FAILED", "Failed to read config file", path, &e)
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::at_path("CONFIG_INVALID", "Failed to decode config file", path, &e)
        })
    }

    /// Overlay environment values. `lookup` is injectable so tests never touch the real
    /// process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_API_KEY) {
            self.oracle.api_key = Some(v);
        }
        if let Some(v) = get(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_ORACLE_PROVIDER) {
            self.oracle.provider = OracleProvider::parse(&v)?;
        }
        if let Some(v) = get(ENV_ORACLE_MODEL) {
            self.oracle.model = v;
        }
        if let Some(v) = get(ENV_OLLAMA_URL) {
            self.oracle.ollama_url = v.clone();
            self.embeddings.ollama_url = v;
        }
        if let Some(v) = get(ENV_EMBED_MODEL) {
            self.embeddings.model = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.pipeline.validate()?;
        if self.chunking.chunk_size == 0 || self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "chunking.chunk_overlap must be smaller than a non-zero chunk_size",
            )
            .with_details(format!(
                "chunk_size={}; chunk_overlap={}",
                self.chunking.chunk_size, self.chunking.chunk_overlap
            )));
        }
        if self.oracle.timeout_secs == 0 || self.embeddings.timeout_secs == 0 {
            return Err(AppError::new("CONFIG_INVALID", "Timeouts must be at least one second"));
        }
        if self.oracle.model.trim().is_empty() || self.embeddings.model.trim().is_empty() {
            return Err(AppError::new("CONFIG_INVALID", "Model names must not be empty"));
        }
        Ok(())
    }

    pub fn evidence_dir(&self) -> PathBuf {
        self.data_dir.join("evidence")
    }
}
