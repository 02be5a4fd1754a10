//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge typed defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_RETRIEVAL__TOP_N=5`). Provides helpers to expand `~` and `${VAR}` and
//! to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    pub retrieval: RetrievalSettings,
    pub exclusion: ExclusionSettings,
    pub flavor: FlavorSettings,
    pub rerank: RerankSettings,
    pub embedding: EmbeddingSettings,
    pub data: DataSettings,
}

/// Rank-fusion weights and pool sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    pub semantic_weight: f32,
    pub lexical_weight: f32,
    /// Smoothing constant `c` in `weight / (rank + c)`.
    pub rrf_k: f32,
    pub candidate_pool: usize,
    pub top_n: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { semantic_weight: 0.7, lexical_weight: 0.3, rrf_k: 60.0, candidate_pool: 200, top_n: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionSettings {
    /// 0-100 fuzzy ratio at which a token counts as a negative term.
    pub fuzzy_threshold: f32,
    /// A document is dropped once any negative-term cosine reaches this.
    pub similarity_threshold: f32,
}

impl Default for ExclusionSettings {
    fn default() -> Self {
        Self { fuzzy_threshold: 85.0, similarity_threshold: 0.6 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorSettings {
    pub fuzzy_threshold: f32,
    pub boost_per_match: f32,
    pub max_lexical_boost: f32,
    pub contrast_factor: f32,
}

impl Default for FlavorSettings {
    fn default() -> Self {
        Self { fuzzy_threshold: 85.0, boost_per_match: 0.1, max_lexical_boost: 0.3, contrast_factor: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankSettings {
    pub rejection_weight: f32,
}

impl Default for RerankSettings {
    fn default() -> Self {
        Self { rejection_weight: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub dim: usize,
    pub max_len: usize,
    pub model_dir: Option<String>,
    pub use_fake: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { dim: 1024, max_len: 256, model_dir: None, use_fake: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    pub documents: String,
    pub tantivy_index_dir: String,
    pub lancedb_dir: String,
    pub table: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            documents: "data/coffee.jsonl".to_string(),
            tantivy_index_dir: "data/indexes/tantivy".to_string(),
            lancedb_dir: "data/indexes/lancedb".to_string(),
            table: "beans".to_string(),
        }
    }
}

impl DataSettings {
    pub fn documents_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.documents)
    }

    pub fn tantivy_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.tantivy_index_dir)
    }

    pub fn lancedb_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.lancedb_dir)
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let r = &self.retrieval;
        for (name, w) in [
            ("retrieval.semantic_weight", r.semantic_weight),
            ("retrieval.lexical_weight", r.lexical_weight),
            ("retrieval.rrf_k", r.rrf_k),
            ("rerank.rejection_weight", self.rerank.rejection_weight),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidConfig(format!("{name} must be a finite non-negative number, got {w}")));
            }
        }
        if r.semantic_weight + r.lexical_weight <= 0.0 {
            return Err(Error::InvalidConfig("retrieval weights must not both be zero".into()));
        }
        if r.top_n == 0 {
            return Err(Error::InvalidConfig("top_n must be at least 1".into()));
        }
        if r.candidate_pool < r.top_n {
            return Err(Error::InvalidConfig(format!(
                "candidate_pool ({}) must be >= top_n ({})",
                r.candidate_pool, r.top_n
            )));
        }
        for (name, t) in [("exclusion.fuzzy_threshold", self.exclusion.fuzzy_threshold), ("flavor.fuzzy_threshold", self.flavor.fuzzy_threshold)] {
            if !(0.0..=100.0).contains(&t) {
                return Err(Error::InvalidConfig(format!("{name} must be within [0, 100], got {t}")));
            }
        }
        if !(-1.0..=1.0).contains(&self.exclusion.similarity_threshold) {
            return Err(Error::InvalidConfig(format!(
                "exclusion.similarity_threshold must be within [-1, 1], got {}",
                self.exclusion.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.flavor.contrast_factor) {
            return Err(Error::InvalidConfig(format!(
                "flavor.contrast_factor must be within [0, 1], got {}",
                self.flavor.contrast_factor
            )));
        }
        if [self.flavor.boost_per_match, self.flavor.max_lexical_boost].iter().any(|b| !b.is_finite() || *b < 0.0) {
            return Err(Error::InvalidConfig("flavor lexical boost values must be non-negative".into()));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be at least 1".into()));
        }
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.retrieval.semantic_weight, 0.7);
        assert_eq!(settings.retrieval.lexical_weight, 0.3);
        assert_eq!(settings.retrieval.candidate_pool, 200);
        assert_eq!(settings.exclusion.fuzzy_threshold, 85.0);
    }

    #[test]
    fn file_and_env_layers_override_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("RUST_ENV", "dev");
            jail.create_file("config.toml", "[retrieval]\nsemantic_weight = 0.6\nlexical_weight = 0.4\n")?;
            jail.create_file("config.dev.toml", "[exclusion]\nsimilarity_threshold = 0.5\n")?;
            jail.set_env("APP_RETRIEVAL__TOP_N", "5");

            let config = Config::load().expect("load");
            let settings = config.settings().expect("settings");
            assert_eq!(settings.retrieval.semantic_weight, 0.6);
            assert_eq!(settings.retrieval.top_n, 5);
            assert_eq!(settings.retrieval.candidate_pool, 200);
            assert_eq!(settings.exclusion.similarity_threshold, 0.5);
            let top_n: usize = config.get("retrieval.top_n").expect("get");
            assert_eq!(top_n, 5);
            Ok(())
        });
    }

    #[test]
    fn invalid_layer_is_rejected_at_load() {
        Jail::expect_with(|jail| {
            jail.set_env("RUST_ENV", "test");
            jail.create_file("config.test.toml", "[retrieval]\ntop_n = 50\ncandidate_pool = 20\n")?;
            assert!(Config::load().is_err());
            Ok(())
        });
    }

    #[test]
    fn validation_rules() {
        let mut s = Settings::default();
        s.retrieval.semantic_weight = 0.0;
        s.retrieval.lexical_weight = 0.0;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.flavor.contrast_factor = 1.5;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.exclusion.fuzzy_threshold = 120.0;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.rerank.rejection_weight = -0.5;
        assert!(matches!(s.validate(), Err(Error::InvalidConfig(msg)) if msg.contains("rerank.rejection_weight")));

        let mut s = Settings::default();
        s.rerank.rejection_weight = 0.0;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn nan_weights_are_rejected() {
        let mut s = Settings::default();
        s.retrieval.semantic_weight = f32::NAN;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.retrieval.lexical_weight = f32::NAN;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.retrieval.rrf_k = f32::NAN;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.rerank.rejection_weight = f32::NAN;
        assert!(s.validate().is_err());
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/srv/beans");
        assert_eq!(resolve_with_base(base, "data/x.jsonl"), PathBuf::from("/srv/beans/data/x.jsonl"));
        assert_eq!(resolve_with_base(base, "/abs/x.jsonl"), PathBuf::from("/abs/x.jsonl"));
    }
}
