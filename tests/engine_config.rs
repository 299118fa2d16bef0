// tests/engine_config.rs
use axum::body::Body;
use axum::http::{Request, StatusCode};
use evidence_scoring_engine::config::{
    EngineConfig, SimilarityBackend, ENV_ENGINE_CONFIG_PATH, ENV_STANCE_SIMILARITY,
};
use evidence_scoring_engine::EvidenceEngine;
use std::{env, fs};
use tower::ServiceExt;

fn clear_env() {
    env::remove_var(ENV_ENGINE_CONFIG_PATH);
    env::remove_var(ENV_STANCE_SIMILARITY);
}

#[serial_test::serial]
#[test]
fn env_path_is_loaded() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("engine.toml");
    fs::write(
        &p,
        r#"
[stance]
min_evidence_chars = 25
similarity = "none"

[server]
max_claim_chars = 280
"#,
    )
    .unwrap();

    env::set_var(ENV_ENGINE_CONFIG_PATH, p.display().to_string());
    let cfg = EngineConfig::load().unwrap();
    clear_env();

    assert_eq!(cfg.stance.min_evidence_chars, 25);
    assert_eq!(cfg.stance.similarity, SimilarityBackend::None);
    assert!((cfg.stance.short_evidence_confidence - 0.3).abs() < 1e-6);
    assert_eq!(cfg.server.max_claim_chars, 280);
    assert_eq!(cfg.server.max_evidence_items, 50);
}

#[serial_test::serial]
#[test]
fn missing_file_falls_back_to_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    env::set_var(
        ENV_ENGINE_CONFIG_PATH,
        dir.path().join("nope.toml").display().to_string(),
    );
    let cfg = EngineConfig::load().unwrap();
    clear_env();
    assert_eq!(cfg, EngineConfig::default());
}

#[serial_test::serial]
#[test]
fn invalid_file_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("engine.toml");
    fs::write(&p, "[stance]\nmin_evidence_chars = \"ten\"\n").unwrap();
    env::set_var(ENV_ENGINE_CONFIG_PATH, p.display().to_string());
    let res = EngineConfig::load();
    clear_env();
    assert!(res.is_err());
}

#[serial_test::serial]
#[test]
fn similarity_env_override_selects_strategy() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    env::set_var(
        ENV_ENGINE_CONFIG_PATH,
        dir.path().join("absent.toml").display().to_string(),
    );

    env::set_var(ENV_STANCE_SIMILARITY, "none");
    let cfg = EngineConfig::load().unwrap();
    assert_eq!(cfg.stance.similarity, SimilarityBackend::None);
    assert_eq!(EvidenceEngine::from_config(&cfg).stance().strategy_name(), "keyword");

    env::set_var(ENV_STANCE_SIMILARITY, "TERM_VECTOR");
    let cfg = EngineConfig::load().unwrap();
    assert_eq!(
        EvidenceEngine::from_config(&cfg).stance().strategy_name(),
        "term_vector"
    );

    // unknown values are ignored
    env::set_var(ENV_STANCE_SIMILARITY, "bert-large");
    let cfg = EngineConfig::load().unwrap();
    assert_eq!(cfg.stance.similarity, SimilarityBackend::TermVector);

    clear_env();
}

#[serial_test::serial]
#[tokio::test]
async fn app_applies_server_limits_from_config() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("engine.toml");
    fs::write(&p, "[server]\nmax_claim_chars = 20\n").unwrap();
    env::set_var(ENV_ENGINE_CONFIG_PATH, p.display().to_string());
    let app = evidence_scoring_engine::app().expect("app() should build Router in tests");
    clear_env();

    let req = Request::builder()
        .method("POST")
        .uri("/stance")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"claim": "Coffee consumption raises blood pressure in adults", "evidence": []}"#,
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = Request::builder()
        .method("POST")
        .uri("/stance")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"claim": "Coffee raises BP", "evidence": []}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
