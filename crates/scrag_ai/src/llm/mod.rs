use scrag_core::error::AppError;

/// The judgment oracle: prompt in, free text out.
///
/// Implementations make no promise about the shape of the text; call sites that expect JSON
/// go through [`crate::judgment::judge`].
pub trait Llm: Send + Sync {
    fn invoke(&self, prompt: &str) -> Result<String, AppError>;
}

pub mod groq_llm;
pub mod ollama_llm;

pub use groq_llm::GroqLlm;
pub use ollama_llm::OllamaLlm;
