//! Process wiring: load the data sources named in [`Settings`], start the
//! background embedding build and hand back a ready-to-serve [`ChatService`].

use std::sync::Arc;

use anyhow::anyhow;
use jobmatch_core::config::Settings;
use jobmatch_core::corpus::load_job_records_or_empty;
use jobmatch_core::session_details::load_session_details_or_empty;
use jobmatch_core::traits::Embedder;
use jobmatch_embed::{build_embedder, HashEmbedder};
use jobmatch_index::{BuildOptions, BuildReport, EmbeddingCache, EmbeddingIndex, RetrievalEngine};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::endpoint::ChatService;
use crate::moderation::ModerationGate;
use crate::resolver::DialogueResolver;

#[derive(Debug, Clone, Copy, Default)]
pub struct StartOptions {
    pub show_progress: bool,
    pub force_rebuild: bool,
}

pub struct Runtime {
    service: ChatService,
    build: JoinHandle<BuildReport>,
}

impl Runtime {
    /// Must be called inside a tokio runtime. Returns before the corpus is
    /// embedded; searches wait for it (bounded) on their own.
    pub fn start(settings: &Settings, options: StartOptions) -> Runtime {
        let corpus = load_job_records_or_empty(&settings.data.corpus_csv);
        let details =
            load_session_details_or_empty(&settings.data.session_details_json, settings.data.create_session_details);
        info!(entries = details.len(), "loaded session details");

        let embedder = embedder_or_fallback(settings);
        let cache = EmbeddingCache::new(&settings.data.embedding_cache);
        let build_options = BuildOptions {
            batch_size: settings.embedding.batch_size,
            show_progress: options.show_progress,
            force_rebuild: options.force_rebuild,
        };
        let (index, build) = EmbeddingIndex::spawn_build(corpus, embedder, Some(cache), build_options);

        let engine = Arc::new(RetrievalEngine::new(Arc::new(index), &settings.retrieval));
        let gate = ModerationGate::from_settings(&settings.moderation);
        info!(phrases = gate.phrases().len(), "moderation gate ready");
        let resolver = DialogueResolver::new(
            engine,
            gate,
            Arc::new(details),
            settings.retrieval.preview_limit,
        );
        Runtime { service: ChatService::new(Arc::new(resolver)), build }
    }

    pub fn service(&self) -> &ChatService { &self.service }

    /// Wait for the background build and report how it went.
    pub async fn finish_build(self) -> anyhow::Result<(ChatService, BuildReport)> {
        let report = self.build.await.map_err(|e| anyhow!("embedding build task failed: {e}"))?;
        Ok((self.service, report))
    }
}

// Falls back to hash embeddings when the configured model cannot load.
fn embedder_or_fallback(settings: &Settings) -> Arc<dyn Embedder> {
    match build_embedder(&settings.embedding) {
        Ok(embedder) => {
            info!(embedder = embedder.id(), dim = embedder.dim(), "embedder ready");
            embedder
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "embedding model unavailable, falling back to hash embeddings");
            Arc::new(HashEmbedder::new(settings.embedding.dim))
        }
    }
}
