// src/config/mod.rs
pub mod engine;

pub use engine::{
    EngineConfig, ServerConfig, SimilarityBackend, StanceConfig, DEFAULT_ENGINE_CONFIG_PATH,
    ENV_ENGINE_CONFIG_PATH, ENV_STANCE_SIMILARITY,
};
