#![allow(dead_code)]

use std::sync::Arc;

use jobmatch_core::config::RetrievalSettings;
use jobmatch_core::session_details::SessionDetails;
use jobmatch_core::traits::Embedder;
use jobmatch_core::JobRecord;
use jobmatch_dialogue::{DialogueResolver, ModerationGate};
use jobmatch_index::{BuildOptions, EmbeddingIndex, RetrievalEngine};

/// Counts occurrences of a fixed vocabulary; every other word is ignored.
pub struct KeywordEmbedder {
    vocab: Vec<&'static str>,
}

impl KeywordEmbedder {
    pub fn new(vocab: &[&'static str]) -> Self { Self { vocab: vocab.to_vec() } }
}

impl Embedder for KeywordEmbedder {
    fn id(&self) -> &str { "keyword" }
    fn dim(&self) -> usize { self.vocab.len() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut v = vec![0f32; self.vocab.len()];
                for token in text.split(|c: char| !c.is_alphanumeric()).map(str::to_lowercase) {
                    if let Some(i) = self.vocab.iter().position(|w| *w == token) { v[i] += 1.0; }
                }
                v
            })
            .collect())
    }
}

/// Embeds the corpus fine but fails on every query.
pub struct QueryFailingEmbedder {
    pub panic: bool,
}

impl Embedder for QueryFailingEmbedder {
    fn id(&self) -> &str { "query-failing" }
    fn dim(&self) -> usize { 2 }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.len() > 1 {
            return Ok(vec![vec![1.0, 0.0]; texts.len()]);
        }
        if self.panic {
            panic!("tokenizer blew up");
        }
        anyhow::bail!("query embedding failed")
    }
}

pub fn job(title: &str, company: &str, description: &str) -> JobRecord {
    JobRecord {
        id: format!("{title}@{company}"),
        title: title.to_string(),
        company: company.to_string(),
        description: description.to_string(),
        ..JobRecord::default()
    }
}

pub async fn resolver_with(
    records: Vec<JobRecord>,
    embedder: Arc<dyn Embedder>,
    details: SessionDetails,
) -> anyhow::Result<DialogueResolver> {
    let (index, _) = EmbeddingIndex::build(records, embedder, None, BuildOptions::default()).await?;
    let settings = RetrievalSettings::default();
    let engine = Arc::new(RetrievalEngine::new(Arc::new(index), &settings));
    Ok(DialogueResolver::new(engine, ModerationGate::default(), Arc::new(details), settings.preview_limit))
}

pub async fn resolver_over(records: Vec<JobRecord>, vocab: &[&'static str]) -> anyhow::Result<DialogueResolver> {
    resolver_with(records, Arc::new(KeywordEmbedder::new(vocab)), SessionDetails::default()).await
}
