//! Side-cache of corpus embeddings.
//!
//! Layout (little-endian): magic `JMEC`, `u32` version, `u32` embedder id
//! length, the id as UTF-8, `u64` vector count, `u32` dimension, then
//! `count * dim` `f32` values in corpus order.
//!
//! Validity is decided by vector count alone. Editing the corpus without
//! changing its size keeps serving the old vectors until the cache file is
//! deleted or `jobmatch embed --force` is run. A cache written by another
//! embedder is still served, with a warning.

use std::fs;
use std::path::{Path, PathBuf};

use jobmatch_core::error::{Error, Result};
use tracing::{error, info, warn};

const MAGIC: &[u8; 4] = b"JMEC";
const VERSION: u32 = 2;
// Header bytes around the variable-length embedder id.
const FIXED_HEADER_LEN: usize = 4 + 4 + 4 + 8 + 4;

/// Decoded cache contents and the embedder that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEmbeddings {
    pub embedder_id: String,
    pub vectors: Vec<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    path: PathBuf,
}

impl EmbeddingCache {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }

    /// `Ok(None)` when no cache file exists.
    pub fn read(&self) -> Result<Option<CachedEmbeddings>> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };
        decode(&bytes).map(Some).map_err(|reason| Error::Cache { path: self.path.clone(), reason })
    }

    /// Cached vectors if the file holds exactly `corpus_len` of them. Any
    /// other outcome is a miss; unreadable files are logged.
    pub fn load_for_corpus(&self, corpus_len: usize, embedder_id: &str) -> Option<Vec<Vec<f32>>> {
        match self.read() {
            Ok(Some(cached)) if cached.vectors.len() == corpus_len => {
                info!(count = corpus_len, path = %self.path.display(), "loaded cached job embeddings");
                warn!("embedding cache is validated by record count only; delete it after editing job listings");
                if cached.embedder_id != embedder_id {
                    warn!(
                        cached = %cached.embedder_id,
                        current = embedder_id,
                        "embedding cache was written by a different embedder; run `jobmatch embed --force` to rebuild"
                    );
                }
                Some(cached.vectors)
            }
            Ok(Some(cached)) => {
                info!(cached = cached.vectors.len(), corpus = corpus_len, "cache length mismatch, recomputing embeddings");
                None
            }
            Ok(None) => None,
            Err(e) => {
                error!(error = %e, "error loading cached embeddings");
                None
            }
        }
    }

    /// Replace the cache atomically (write a sibling temp file, then rename).
    pub fn write(&self, embedder_id: &str, vectors: &[Vec<f32>]) -> Result<()> {
        let bytes = encode(embedder_id, vectors).map_err(|reason| Error::Cache { path: self.path.clone(), reason })?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file_name = self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "embeddings".to_string());
        let tmp = self.path.with_file_name(format!("{file_name}.tmp"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        info!(count = vectors.len(), embedder = embedder_id, path = %self.path.display(), "wrote embedding cache");
        Ok(())
    }
}

fn encode(embedder_id: &str, vectors: &[Vec<f32>]) -> std::result::Result<Vec<u8>, String> {
    let dim = vectors.first().map_or(0, Vec::len);
    if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
        return Err(format!("vector {} has dimension {} but vector 0 has {}", i, v.len(), dim));
    }
    let dim32 = u32::try_from(dim).map_err(|_| format!("dimension {dim} too large"))?;
    let id = embedder_id.as_bytes();
    let id_len = u32::try_from(id.len()).map_err(|_| "embedder id too long".to_string())?;
    let mut out = Vec::with_capacity(FIXED_HEADER_LEN + id.len() + vectors.len() * dim * 4);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&id_len.to_le_bytes());
    out.extend_from_slice(id);
    out.extend_from_slice(&(vectors.len() as u64).to_le_bytes());
    out.extend_from_slice(&dim32.to_le_bytes());
    for v in vectors {
        for x in v { out.extend_from_slice(&x.to_le_bytes()); }
    }
    Ok(out)
}

fn decode(bytes: &[u8]) -> std::result::Result<CachedEmbeddings, String> {
    if bytes.len() < FIXED_HEADER_LEN || &bytes[..4] != MAGIC {
        return Err("not an embedding cache file".to_string());
    }
    let version = u32::from_le_bytes(take4(&bytes[4..8]));
    if version != VERSION {
        return Err(format!("unsupported cache version {version}"));
    }
    let id_len = u32::from_le_bytes(take4(&bytes[8..12])) as usize;
    let header_len = FIXED_HEADER_LEN.checked_add(id_len).ok_or("cache header overflows")?;
    if bytes.len() < header_len {
        return Err(format!("embedder id of {id_len} bytes runs past the end of the file"));
    }
    let embedder_id = std::str::from_utf8(&bytes[12..12 + id_len])
        .map_err(|e| format!("embedder id is not UTF-8: {e}"))?
        .to_string();
    let rest = &bytes[12 + id_len..];
    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&rest[..8]);
    let count = usize::try_from(u64::from_le_bytes(count_bytes)).map_err(|_| "vector count overflows usize".to_string())?;
    let dim = u32::from_le_bytes(take4(&rest[8..12])) as usize;

    let body = &bytes[header_len..];
    let expected = count.checked_mul(dim).and_then(|n| n.checked_mul(4)).ok_or("cache header overflows")?;
    if body.len() != expected {
        return Err(format!("expected {} payload bytes for {}x{}, found {}", expected, count, dim, body.len()));
    }
    let vectors = if dim == 0 {
        vec![Vec::new(); count]
    } else {
        body.chunks_exact(dim * 4)
            .map(|row| row.chunks_exact(4).map(|b| f32::from_le_bytes(take4(b))).collect())
            .collect()
    };
    Ok(CachedEmbeddings { embedder_id, vectors })
}

fn take4(b: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&b[..4]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_checked_before_payload() {
        assert!(decode(b"JMEC").is_err());
        assert!(decode(b"XXXX\x02\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0").is_err());
    }

    #[test]
    fn version_one_files_are_rejected() {
        let mut bytes = encode("hash:d2", &[vec![1.0, 2.0]]).unwrap();
        bytes[4..8].copy_from_slice(&1u32.to_le_bytes());
        assert!(decode(&bytes).unwrap_err().contains("version 1"));
    }

    #[test]
    fn oversized_id_length_is_rejected() {
        let mut bytes = encode("hash:d2", &[vec![1.0, 2.0]]).unwrap();
        bytes[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn embedder_id_survives_encoding() {
        let cached = decode(&encode("minilm:all-MiniLM-L6-v2:d384", &[vec![0.25]]).unwrap()).unwrap();
        assert_eq!(cached.embedder_id, "minilm:all-MiniLM-L6-v2:d384");
        assert_eq!(cached.vectors, vec![vec![0.25]]);
    }

    #[test]
    fn ragged_vectors_cannot_be_encoded() {
        assert!(encode("hash:d2", &[vec![1.0, 2.0], vec![3.0]]).is_err());
    }
}
