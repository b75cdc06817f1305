pub mod cache;
pub mod search;
pub mod store;

pub use cache::{CachedEmbeddings, EmbeddingCache};
pub use search::{rank, RetrievalEngine, ScoredJob};
pub use store::{BuildOptions, BuildReport, BuildSource, EmbeddingIndex};
