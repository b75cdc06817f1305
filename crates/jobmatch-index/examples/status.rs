use std::path::Path;

use jobmatch_core::config::Config;
use jobmatch_core::corpus::load_job_records_or_empty;
use jobmatch_index::EmbeddingCache;

// Compare the embedding cache against the configured corpus without touching either.
fn main() -> anyhow::Result<()> {
    let ws_root = Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap_or(Path::new("."));
    let settings = Config::load_from(ws_root)?.settings()?;
    let records = load_job_records_or_empty(&settings.data.corpus_csv);
    let cache = EmbeddingCache::new(&settings.data.embedding_cache);
    match cache.read() {
        Ok(Some(cached)) => {
            let dim = cached.vectors.first().map_or(0, Vec::len);
            let state = if cached.vectors.len() == records.len() { "valid" } else { "stale (length mismatch)" };
            println!(
                "cache: {} vectors x {} dims from {}, corpus: {} records -> {}",
                cached.vectors.len(),
                dim,
                cached.embedder_id,
                records.len(),
                state
            );
        }
        Ok(None) => println!("no cache at {}, corpus: {} records", cache.path().display(), records.len()),
        Err(e) => println!("unreadable cache: {e}"),
    }
    Ok(())
}
