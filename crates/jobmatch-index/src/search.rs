use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use jobmatch_core::config::RetrievalSettings;
use jobmatch_core::JobRecord;
use tracing::info;

use crate::store::EmbeddingIndex;

/// A corpus record that cleared the similarity threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredJob {
    pub index: usize,
    pub score: f32,
    pub record: JobRecord,
}

pub struct RetrievalEngine {
    index: Arc<EmbeddingIndex>,
    threshold: f32,
    ready_timeout: Duration,
}

impl RetrievalEngine {
    pub fn new(index: Arc<EmbeddingIndex>, settings: &RetrievalSettings) -> Self {
        Self { index, threshold: settings.threshold, ready_timeout: Duration::from_secs(settings.ready_timeout_secs) }
    }

    pub fn index(&self) -> &Arc<EmbeddingIndex> { &self.index }

    pub fn threshold(&self) -> f32 { self.threshold }

    /// Rank the corpus against `query` using the configured threshold.
    pub async fn search(&self, query: &str) -> anyhow::Result<Vec<ScoredJob>> {
        self.search_with_threshold(query, self.threshold).await
    }

    /// Records scoring at least `threshold`, best first; equal scores keep
    /// corpus order. Blocks (bounded) while the corpus build is in flight.
    pub async fn search_with_threshold(&self, query: &str, threshold: f32) -> anyhow::Result<Vec<ScoredJob>> {
        if !self.index.is_ready() {
            self.index.wait_ready(self.ready_timeout).await;
        }
        let query_vec = self.index.embed_query(query).await?;
        let ranked = rank(self.index.score_all(&query_vec).await, threshold);
        info!(matches = ranked.len(), query, "semantic search");
        let corpus = self.index.corpus();
        Ok(ranked
            .into_iter()
            .map(|(index, score)| ScoredJob { index, score, record: corpus[index].clone() })
            .collect())
    }
}

/// Keep scores `>= threshold` (NaN never qualifies) and sort descending.
/// The sort is stable, so ties keep their input order.
pub fn rank(scores: Vec<(usize, f32)>, threshold: f32) -> Vec<(usize, f32)> {
    let mut kept: Vec<(usize, f32)> = scores.into_iter().filter(|(_, s)| *s >= threshold).collect();
    kept.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    kept
}
