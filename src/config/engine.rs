// src/config/engine.rs
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use tracing::{info, warn};

pub const DEFAULT_ENGINE_CONFIG_PATH: &str = "config/engine.toml";
pub const ENV_ENGINE_CONFIG_PATH: &str = "ENGINE_CONFIG_PATH";
/// "term_vector" | "none"; overrides `[stance].similarity`.
pub const ENV_STANCE_SIMILARITY: &str = "STANCE_SIMILARITY";

fn default_min_evidence_chars() -> usize {
    10
}
fn default_short_evidence_confidence() -> f32 {
    0.3
}
fn default_max_claim_chars() -> usize {
    5000
}
fn default_max_evidence_items() -> usize {
    50
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBackend {
    #[default]
    TermVector,
    None,
}

impl SimilarityBackend {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "term_vector" => Some(Self::TermVector),
            "none" | "off" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceConfig {
    /// Evidence shorter than this (in chars) is forced neutral.
    #[serde(default = "default_min_evidence_chars")]
    pub min_evidence_chars: usize,
    #[serde(default = "default_short_evidence_confidence")]
    pub short_evidence_confidence: f32,
    #[serde(default)]
    pub similarity: SimilarityBackend,
}

impl Default for StanceConfig {
    fn default() -> Self {
        Self {
            min_evidence_chars: default_min_evidence_chars(),
            short_evidence_confidence: default_short_evidence_confidence(),
            similarity: SimilarityBackend::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_max_claim_chars")]
    pub max_claim_chars: usize,
    #[serde(default = "default_max_evidence_items")]
    pub max_evidence_items: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_claim_chars: default_max_claim_chars(),
            max_evidence_items: default_max_evidence_items(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub stance: StanceConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl EngineConfig {
    /// Resolve the path from `ENGINE_CONFIG_PATH` (default `config/engine.toml`).
    /// A missing file yields defaults; an unreadable or invalid one is an error.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_ENGINE_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ENGINE_CONFIG_PATH));

        let mut cfg = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            info!(target: "config", path = %path.display(), "engine config not found, using defaults");
            Self::default()
        };

        if let Ok(raw) = std::env::var(ENV_STANCE_SIMILARITY) {
            match SimilarityBackend::parse(&raw) {
                Some(b) => cfg.stance.similarity = b,
                None => warn!(target: "config", value = %raw, "ignoring unknown STANCE_SIMILARITY"),
            }
        }
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read engine config at {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&data)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut cfg: EngineConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Out-of-range values fall back to their defaults.
    fn sanitize(&mut self) {
        let c = &self.stance.short_evidence_confidence;
        if !c.is_finite() || !(0.0..=1.0).contains(c) {
            self.stance.short_evidence_confidence = default_short_evidence_confidence();
        }
        if self.server.max_claim_chars == 0 {
            self.server.max_claim_chars = default_max_claim_chars();
        }
        if self.server.max_evidence_items == 0 {
            self.server.max_evidence_items = default_max_evidence_items();
        }
    }
}
