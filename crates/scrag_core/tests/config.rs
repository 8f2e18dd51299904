use std::collections::HashMap;
use std::fs;

use pretty_assertions::assert_eq;
use scrag_core::config::{AppConfig, OracleProvider, PipelineConfig};
use scrag_core::domain::PipelineStatus;
use tempfile::tempdir;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_match_tuned_pipeline_values() {
    let cfg = AppConfig::default();
    assert_eq!(cfg.pipeline.relevance_threshold, 7);
    assert_eq!(cfg.pipeline.high_confidence, 90);
    assert_eq!(cfg.pipeline.medium_confidence, 70);
    assert_eq!(cfg.pipeline.top_k, 5);
    assert_eq!(cfg.pipeline.preview_chars, 500);
    assert_eq!(cfg.chunking.chunk_size, 1000);
    assert_eq!(cfg.chunking.chunk_overlap, 200);
    assert_eq!(cfg.oracle.provider, OracleProvider::Groq);
    assert!(cfg.oracle.api_key.is_none());
    cfg.validate().expect("defaults are valid");
}

#[test]
fn classify_uses_inclusive_lower_bounds() {
    let p = PipelineConfig::default();
    assert_eq!(p.classify(100), PipelineStatus::HighConfidence);
    assert_eq!(p.classify(90), PipelineStatus::HighConfidence);
    assert_eq!(p.classify(89), PipelineStatus::MediumConfidence);
    assert_eq!(p.classify(70), PipelineStatus::MediumConfidence);
    assert_eq!(p.classify(69), PipelineStatus::LowConfidence);
    assert_eq!(p.classify(0), PipelineStatus::LowConfidence);

    assert!(p.is_relevant(7.0));
    assert!(p.is_relevant(10.0));
    assert!(!p.is_relevant(6.0));
    assert!(!p.is_relevant(6.5));
    assert!(!p.is_relevant(6.99));
}

#[test]
fn thresholds_are_configurable() {
    let p = PipelineConfig {
        high_confidence: 80,
        medium_confidence: 50,
        relevance_threshold: 5,
        ..PipelineConfig::default()
    };
    assert_eq!(p.classify(80), PipelineStatus::HighConfidence);
    assert_eq!(p.classify(50), PipelineStatus::MediumConfidence);
    assert!(p.is_relevant(5.0));
}

#[test]
fn env_overlays_file_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scrag.json");
    fs::write(
        &path,
        r#"{"data_dir": "/tmp/from-file", "pipeline": {"top_k": 3}, "oracle": {"model": "file-model"}}"#,
    )
    .unwrap();

    let mut cfg = AppConfig::from_file(&path).unwrap();
    assert_eq!(cfg.pipeline.top_k, 3);
    // Unspecified fields fall back to defaults.
    assert_eq!(cfg.pipeline.relevance_threshold, 7);

    cfg.apply_env(env_of(&[
        ("GROQ_API_KEY", "gsk_test"),
        ("SCRAG_ORACLE_PROVIDER", "Ollama"),
        ("SCRAG_OLLAMA_URL", "http://127.0.0.1:9999"),
        ("SCRAG_DATA_DIR", "  "),
    ]))
    .unwrap();

    assert_eq!(cfg.oracle.api_key.as_deref(), Some("gsk_test"));
    assert_eq!(cfg.oracle.provider, OracleProvider::Ollama);
    assert_eq!(cfg.oracle.model, "file-model");
    assert_eq!(cfg.embeddings.ollama_url, "http://127.0.0.1:9999");
    // Blank values are ignored.
    assert_eq!(cfg.data_dir.to_string_lossy(), "/tmp/from-file");
}

#[test]
fn unknown_provider_is_rejected() {
    let mut cfg = AppConfig::default();
    let err = cfg
        .apply_env(env_of(&[("SCRAG_ORACLE_PROVIDER", "carrier-pigeon")]))
        .unwrap_err();
    assert_eq!(err.code, "CONFIG_INVALID");
}

#[test]
fn invalid_thresholds_fail_validation() {
    let mut cfg = AppConfig::default();
    cfg.pipeline.medium_confidence = 95;
    assert_eq!(cfg.validate().unwrap_err().code, "CONFIG_INVALID");

    let mut cfg = AppConfig::default();
    cfg.pipeline.relevance_threshold = 11;
    assert_eq!(cfg.validate().unwrap_err().code, "CONFIG_INVALID");

    let mut cfg = AppConfig::default();
    cfg.chunking.chunk_overlap = cfg.chunking.chunk_size;
    assert_eq!(cfg.validate().unwrap_err().code, "CONFIG_INVALID");
}

#[test]
fn api_key_is_never_serialized() {
    let mut cfg = AppConfig::default();
    cfg.oracle.api_key = Some("secret".to_string());
    let json = serde_json::to_string(&cfg).unwrap();
    assert!(!json.contains("secret"));
}

#[test]
fn missing_config_file_is_a_read_error() {
    let dir = tempdir().unwrap();
    let err = AppConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code, "CONFIG_READ_FAILED");
}
