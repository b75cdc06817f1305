use std::path::PathBuf;

use jobmatch_embed::{cosine_similarity, Embedder, MiniLmEmbedder};

// cargo run -p jobmatch-embed --example embed -- models/all-MiniLM-L6-v2
fn main() -> anyhow::Result<()> {
    let model_dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("models/all-MiniLM-L6-v2"));
    let embedder = MiniLmEmbedder::load(&model_dir, 256)?;
    let texts = vec!["data analyst in pune".to_string(), "business intelligence analyst".to_string(), "forklift driver".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("B={} dim={}", embs.len(), embedder.dim());
    for (text, v) in texts.iter().zip(&embs).skip(1) {
        println!("{:>32} ~ {:.3}", text, cosine_similarity(&embs[0], v));
    }
    Ok(())
}
