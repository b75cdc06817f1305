/// A text embedding backend.
///
/// Implementations must be deterministic for a fixed model and return vectors
/// of exactly `dim()` components.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the backend and its dimensionality (e.g. `hash:d384`).
    fn id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder {} returned no vector", self.id()))
    }
}
