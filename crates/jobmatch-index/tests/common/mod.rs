#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use jobmatch_core::traits::Embedder;
use jobmatch_core::JobRecord;

/// Counts occurrences of a fixed vocabulary; anything else is ignored. Makes
/// cosine scores easy to work out by hand.
pub struct KeywordEmbedder {
    vocab: Vec<&'static str>,
    pub batches: AtomicUsize,
    /// Sleep before embedding batches of more than one text (corpus builds).
    pub corpus_delay: Option<Duration>,
}

impl KeywordEmbedder {
    pub fn new(vocab: &[&'static str]) -> Self {
        Self { vocab: vocab.to_vec(), batches: AtomicUsize::new(0), corpus_delay: None }
    }

    pub fn slow(vocab: &[&'static str], delay: Duration) -> Self {
        Self { corpus_delay: Some(delay), ..Self::new(vocab) }
    }

    pub fn batches(&self) -> usize { self.batches.load(Ordering::SeqCst) }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.vocab.len()];
        for token in text.split(|c: char| !c.is_alphanumeric()).map(str::to_lowercase) {
            if let Some(i) = self.vocab.iter().position(|w| *w == token) { v[i] += 1.0; }
        }
        v
    }
}

impl Embedder for KeywordEmbedder {
    fn id(&self) -> &str { "keyword" }
    fn dim(&self) -> usize { self.vocab.len() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.corpus_delay.filter(|_| texts.len() > 1) {
            std::thread::sleep(delay);
        }
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn id(&self) -> &str { "failing" }
    fn dim(&self) -> usize { 4 }
    fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("model exploded")
    }
}

pub fn job(id: &str, title: &str, company: &str, description: &str) -> JobRecord {
    JobRecord {
        id: id.to_string(),
        title: title.to_string(),
        company: company.to_string(),
        description: description.to_string(),
        ..JobRecord::default()
    }
}
