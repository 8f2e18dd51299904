pub mod context;
pub mod corpus;
pub mod embeddings;
pub mod evidence;
pub mod guardrails;
pub mod judgment;
pub mod llm;
pub mod ollama;
pub mod pipeline;
pub mod retrieve;
pub mod text;

pub use context::AppContext;
pub use corpus::Corpus;
pub use pipeline::Pipeline;
