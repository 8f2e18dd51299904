pub mod chunking;
pub mod index;
pub mod model;
pub mod store;

mod persist;

pub use index::{IndexBuildInput, IndexStatus, IndexStore};
pub use model::{EvidenceChunk, EvidenceChunkSummary, EvidenceSource};
pub use store::{BuildChunksResult, EvidenceStore};
