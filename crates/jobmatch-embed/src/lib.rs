use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use jobmatch_core::config::{EmbeddingBackend, EmbeddingSettings};
pub use jobmatch_core::traits::Embedder;

pub mod device;
pub mod hash;
pub mod minilm;
pub mod pool;
pub mod similarity;
pub mod tokenize;

pub use hash::HashEmbedder;
pub use minilm::MiniLmEmbedder;
pub use pool::masked_mean_l2;
pub use similarity::{cosine_similarity, l2_normalize};

/// `APP_USE_FAKE_EMBEDDINGS=1|true` forces the hash backend, e.g. in tests.
pub fn fake_embeddings_forced() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn build_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    if fake_embeddings_forced() {
        info!(dim = settings.dim, "APP_USE_FAKE_EMBEDDINGS set, using hash embedder");
        return Ok(Arc::new(HashEmbedder::new(settings.dim)));
    }
    match settings.backend {
        EmbeddingBackend::Hash => Ok(Arc::new(HashEmbedder::new(settings.dim))),
        EmbeddingBackend::Minilm => Ok(Arc::new(MiniLmEmbedder::load(&settings.model_dir, settings.max_len)?)),
    }
}

pub fn get_default_embedder() -> Result<Arc<dyn Embedder>> {
    build_embedder(&EmbeddingSettings::default())
}
