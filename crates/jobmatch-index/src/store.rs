//! Corpus store and embedding index.
//!
//! The corpus is fixed for the process lifetime. Its vectors are filled in by
//! a single background build (cache hit or fresh computation) while the front
//! end is already serving; a watch channel flips to `true` exactly once when
//! that build is over, whether it succeeded or degraded.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use indicatif::{ProgressBar, ProgressStyle};
use jobmatch_core::traits::Embedder;
use jobmatch_core::{Error, JobRecord};
use jobmatch_embed::cosine_similarity;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::cache::EmbeddingCache;

type Slots = Arc<RwLock<Vec<Option<Vec<f32>>>>>;

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub batch_size: usize,
    /// Draw a terminal progress bar while computing.
    pub show_progress: bool,
    /// Ignore an existing cache and recompute everything.
    pub force_rebuild: bool,
}

impl Default for BuildOptions {
    fn default() -> Self { Self { batch_size: 32, show_progress: false, force_rebuild: false } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSource {
    Cache,
    Computed,
    /// Some batches failed to embed; those records are invisible to search.
    Degraded { failed: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub records: usize,
    pub embedded: usize,
    pub source: BuildSource,
}

pub struct EmbeddingIndex {
    corpus: Arc<Vec<JobRecord>>,
    embedder: Arc<dyn Embedder>,
    vectors: Slots,
    ready: watch::Receiver<bool>,
}

impl EmbeddingIndex {
    /// Start the corpus embedding build on a blocking task and return at once.
    /// Must be called from within a tokio runtime.
    pub fn spawn_build(
        corpus: Vec<JobRecord>,
        embedder: Arc<dyn Embedder>,
        cache: Option<EmbeddingCache>,
        options: BuildOptions,
    ) -> (Self, JoinHandle<BuildReport>) {
        let (tx, rx) = watch::channel(false);
        let corpus = Arc::new(corpus);
        let vectors: Slots = Arc::new(RwLock::new(vec![None; corpus.len()]));
        let handle = {
            let corpus = Arc::clone(&corpus);
            let embedder = Arc::clone(&embedder);
            let vectors = Arc::clone(&vectors);
            tokio::task::spawn_blocking(move || {
                let report = run_build(&corpus, embedder.as_ref(), cache.as_ref(), &vectors, options);
                tx.send_replace(true);
                info!(records = report.records, embedded = report.embedded, source = ?report.source, "job embeddings ready");
                report
            })
        };
        (Self { corpus, embedder, vectors, ready: rx }, handle)
    }

    /// Build and wait for completion.
    pub async fn build(
        corpus: Vec<JobRecord>,
        embedder: Arc<dyn Embedder>,
        cache: Option<EmbeddingCache>,
        options: BuildOptions,
    ) -> anyhow::Result<(Self, BuildReport)> {
        let (index, handle) = Self::spawn_build(corpus, embedder, cache, options);
        let report = handle.await.map_err(|e| anyhow!("embedding build task failed: {e}"))?;
        Ok((index, report))
    }

    /// An index over precomputed vectors, ready immediately.
    pub fn from_vectors(corpus: Vec<JobRecord>, embedder: Arc<dyn Embedder>, vectors: Vec<Vec<f32>>) -> anyhow::Result<Self> {
        if corpus.len() != vectors.len() {
            return Err(Error::Embedding(format!("{} records but {} vectors", corpus.len(), vectors.len())).into());
        }
        let (_tx, rx) = watch::channel(true);
        Ok(Self {
            corpus: Arc::new(corpus),
            embedder,
            vectors: Arc::new(RwLock::new(vectors.into_iter().map(Some).collect())),
            ready: rx,
        })
    }

    pub fn corpus(&self) -> &[JobRecord] { &self.corpus }

    pub fn len(&self) -> usize { self.corpus.len() }

    pub fn is_empty(&self) -> bool { self.corpus.is_empty() }

    pub fn is_ready(&self) -> bool { *self.ready.borrow() }

    /// Wait up to `timeout` for the build to finish. `false` means the caller
    /// is about to work with a partially populated index.
    pub async fn wait_ready(&self, timeout: Duration) -> bool {
        let mut rx = self.ready.clone();
        let outcome = tokio::time::timeout(timeout, rx.wait_for(|ready| *ready)).await.map(|r| r.is_ok());
        match outcome {
            Ok(true) => true,
            Ok(false) => {
                warn!("embedding build ended without signalling readiness, searching a partial index");
                false
            }
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs_f32(), "embeddings not ready after waiting, searching a partial index");
                false
            }
        }
    }

    /// Number of records that currently have a vector.
    pub async fn embedded_count(&self) -> usize {
        self.vectors.read().await.iter().filter(|v| v.is_some()).count()
    }

    /// Embed a query off the async executor.
    pub async fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let embedder = Arc::clone(&self.embedder);
        let text = text.to_string();
        tokio::task::spawn_blocking(move || embedder.embed(&text))
            .await
            .map_err(|e| anyhow!("query embedding task failed: {e}"))?
    }

    /// `(corpus index, cosine similarity)` for every record that has a vector, in corpus order.
    pub async fn score_all(&self, query: &[f32]) -> Vec<(usize, f32)> {
        self.vectors
            .read()
            .await
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_deref().map(|v| (i, cosine_similarity(query, v))))
            .collect()
    }
}

fn run_build(
    corpus: &[JobRecord],
    embedder: &dyn Embedder,
    cache: Option<&EmbeddingCache>,
    vectors: &RwLock<Vec<Option<Vec<f32>>>>,
    options: BuildOptions,
) -> BuildReport {
    if let Some(cached) = cache.filter(|_| !options.force_rebuild).and_then(|c| c.load_for_corpus(corpus.len(), embedder.id())) {
        let mut slots = vectors.blocking_write();
        for (slot, v) in slots.iter_mut().zip(cached) { *slot = Some(v); }
        return BuildReport { records: corpus.len(), embedded: corpus.len(), source: BuildSource::Cache };
    }

    info!(records = corpus.len(), embedder = embedder.id(), "computing job embeddings");
    let pb = progress_bar(corpus.len(), options.show_progress);
    let batch_size = options.batch_size.max(1);
    let mut failed = 0usize;
    for start in (0..corpus.len()).step_by(batch_size) {
        let range: Range<usize> = start..(start + batch_size).min(corpus.len());
        let texts: Vec<String> = corpus[range.clone()].iter().map(JobRecord::embedding_text).collect();
        match embedder.embed_batch(&texts) {
            Ok(embs) if embs.len() == texts.len() => {
                let mut slots = vectors.blocking_write();
                for (slot, v) in slots[range.clone()].iter_mut().zip(embs) { *slot = Some(v); }
            }
            Ok(embs) => {
                failed += texts.len();
                error!(expected = texts.len(), got = embs.len(), "embedder returned wrong vector count");
            }
            Err(e) => {
                failed += texts.len();
                error!(first = range.start, len = texts.len(), error = %e, "failed to embed batch");
            }
        }
        pb.inc(texts.len() as u64);
    }
    pb.finish_and_clear();

    let embedded = corpus.len() - failed;
    if failed > 0 {
        warn!(failed, "embedding build degraded; cache left untouched");
        return BuildReport { records: corpus.len(), embedded, source: BuildSource::Degraded { failed } };
    }
    if let Some(cache) = cache {
        let all: Vec<Vec<f32>> = vectors.blocking_read().iter().map(|v| v.clone().unwrap_or_default()).collect();
        if let Err(e) = cache.write(embedder.id(), &all) {
            error!(error = %e, "error caching embeddings");
        }
    }
    BuildReport { records: corpus.len(), embedded, source: BuildSource::Computed }
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible { return ProgressBar::hidden(); }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} jobs ({percent}%)") {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
