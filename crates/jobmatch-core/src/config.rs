//! Configuration loader and path helpers.
//!
//! Figment merges serialized defaults, `config.toml`, `config.<env>.toml` and
//! `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_RETRIEVAL__THRESHOLD=0.4`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    /// Load from the current directory using `RUST_ENV` (default `dev`).
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    pub fn load_from(base_dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(base_dir, &env_name)
    }

    pub fn load_for_env(base_dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base_dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: base_dir.to_path_buf() };
        config.settings()?.validate()?;
        Ok(config)
    }

    /// Typed settings with every data path resolved against the config directory.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.data.corpus_csv = self.resolve(&settings.data.corpus_csv);
        settings.data.session_details_json = self.resolve(&settings.data.session_details_json);
        settings.data.embedding_cache = self.resolve(&settings.data.embedding_cache);
        settings.embedding.model_dir = self.resolve(&settings.embedding.model_dir);
        Ok(settings)
    }

    pub fn base_dir(&self) -> &Path { &self.base_dir }

    fn resolve(&self, p: &Path) -> PathBuf {
        resolve_with_base(&self.base_dir, p.to_string_lossy())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub retrieval: RetrievalSettings,
    pub moderation: ModerationSettings,
    pub embedding: EmbeddingSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        let t = self.retrieval.threshold;
        if !(-1.0..=1.0).contains(&t) {
            return Err(Error::InvalidConfig(format!("retrieval.threshold must lie in [-1, 1], got {t}")));
        }
        if self.retrieval.preview_limit == 0 {
            return Err(Error::InvalidConfig("retrieval.preview_limit must be at least 1".into()));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be greater than 0".into()));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be greater than 0".into()));
        }
        if self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig("embedding.max_len must be greater than 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub corpus_csv: PathBuf,
    pub session_details_json: PathBuf,
    pub embedding_cache: PathBuf,
    /// Write an empty `{}` session-details file when none exists.
    pub create_session_details: bool,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            corpus_csv: PathBuf::from("data/job_listing_data.csv"),
            session_details_json: PathBuf::from("data/session_details.json"),
            embedding_cache: PathBuf::from("data/job_embeddings.bin"),
            create_session_details: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Minimum cosine similarity for a record to count as a match.
    pub threshold: f32,
    /// How many candidates a listing or a disambiguation prompt shows.
    pub preview_limit: usize,
    pub ready_timeout_secs: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { threshold: 0.3, preview_limit: 3, ready_timeout_secs: 10 }
    }
}

pub const DEFAULT_BIAS_PHRASES: [&str; 4] = ["only man", "not for women", "typical male", "stereotype"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationSettings {
    pub phrases: Vec<String>,
}

impl Default for ModerationSettings {
    fn default() -> Self {
        Self { phrases: DEFAULT_BIAS_PHRASES.iter().map(|p| p.to_string()).collect() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Deterministic hashed bag-of-words; no model files needed.
    Hash,
    /// BERT-family sentence encoder (all-MiniLM-L6-v2 layout) run with candle.
    Minilm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub model_dir: PathBuf,
    pub dim: usize,
    pub max_len: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Hash,
            model_dir: PathBuf::from("models/all-MiniLM-L6-v2"),
            dim: 384,
            max_len: 256,
            batch_size: 32,
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
