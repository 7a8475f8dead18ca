use std::io::Write;
use std::path::Path;

use serial_test::serial;

use super::*;

const ENV_KEYS: [&str; 15] = [
    "QUIZZIFY_LLM_PROVIDER",
    "QUIZZIFY_LLM_BASE_URL",
    "QUIZZIFY_LLM_MODEL",
    "QUIZZIFY_LLM_EMBEDDING_MODEL",
    "QUIZZIFY_LLM_TEMPERATURE",
    "QUIZZIFY_LLM_MAX_TOKENS",
    "QUIZZIFY_OPENAI_API_KEY",
    "QUIZZIFY_CHUNK_SIZE",
    "QUIZZIFY_CHUNK_OVERLAP",
    "QUIZZIFY_INDEX_BACKEND",
    "QUIZZIFY_INDEX_PERSIST_DIR",
    "QUIZZIFY_QDRANT_URL",
    "QUIZZIFY_QUIZ_CONTEXT_K",
    "QUIZZIFY_TIMEOUT_LLM",
    "QUIZZIFY_CONFIG",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn defaults_when_file_missing() {
    let config = Config::default();
    assert_eq!(config.llm.provider, ProviderKind::Ollama);
    assert_eq!(config.llm.base_url, "http://localhost:11434");
    assert_eq!(config.llm.model, "mistral:7b");
    assert_eq!(config.llm.embedding_model, "qwen3-embedding");
    assert!((config.llm.temperature - 0.8).abs() < f32::EPSILON);
    assert_eq!(config.llm.max_tokens, 500);
    assert_eq!(config.chunking.separator, "\n");
    assert_eq!(config.chunking.chunk_size, 1000);
    assert_eq!(config.chunking.chunk_overlap, 200);
    assert_eq!(config.index.backend, IndexBackend::Memory);
    assert_eq!(config.quiz.context_k, 4);
    assert_eq!(config.timeouts.llm_seconds, 60);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn load_missing_file_gives_defaults() {
    clear_env();
    let config = Config::load(Path::new("/nonexistent/quizzify.toml")).unwrap();
    assert_eq!(config.llm.model, "mistral:7b");
}

#[test]
#[serial]
fn parse_valid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"
[llm]
provider = "openai"
base_url = "http://custom:1234"
model = "llama3:8b"
temperature = 0.3

[llm.openai]
base_url = "https://api.example.com/v1"
model = "gpt-4o-mini"
embedding_model = "text-embedding-3-small"

[chunking]
chunk_size = 400
chunk_overlap = 40

[index]
backend = "qdrant"
collection_prefix = "lectures"

[quiz]
context_k = 6
"#
    )
    .unwrap();

    clear_env();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.llm.provider, ProviderKind::OpenAi);
    assert_eq!(config.llm.base_url, "http://custom:1234");
    assert_eq!(config.llm.max_tokens, 500);
    let openai = config.llm.openai.as_ref().unwrap();
    assert_eq!(openai.model, "gpt-4o-mini");
    assert_eq!(openai.embedding_model.as_deref(), Some("text-embedding-3-small"));
    assert_eq!(config.chunking.chunk_size, 400);
    assert_eq!(config.chunking.separator, "\n");
    assert_eq!(config.index.backend, IndexBackend::Qdrant);
    assert_eq!(config.index.collection_prefix, "lectures");
    assert_eq!(config.index.batch_size, 32);
    assert_eq!(config.quiz.context_k, 6);
    assert_eq!(config.timeouts.llm_seconds, 60);
}

#[test]
#[serial]
fn invalid_toml_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[llm\nprovider = ").unwrap();
    clear_env();
    assert!(Config::load(&path).is_err());
}

#[test]
#[serial]
fn env_overrides() {
    clear_env();
    let mut config = Config::default();

    unsafe {
        std::env::set_var("QUIZZIFY_LLM_MODEL", "phi3:mini");
        std::env::set_var("QUIZZIFY_LLM_PROVIDER", "openai");
        std::env::set_var("QUIZZIFY_CHUNK_SIZE", "512");
        std::env::set_var("QUIZZIFY_INDEX_BACKEND", "QDRANT");
        std::env::set_var("QUIZZIFY_TIMEOUT_LLM", "15");
        std::env::set_var("QUIZZIFY_QUIZ_CONTEXT_K", "2");
    };
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.llm.model, "phi3:mini");
    assert_eq!(config.llm.provider, ProviderKind::OpenAi);
    assert_eq!(config.chunking.chunk_size, 512);
    assert_eq!(config.index.backend, IndexBackend::Qdrant);
    assert_eq!(config.timeouts.llm_seconds, 15);
    assert_eq!(config.quiz.context_k, 2);
}

#[test]
#[serial]
fn invalid_env_values_ignored() {
    clear_env();
    let mut config = Config::default();

    unsafe {
        std::env::set_var("QUIZZIFY_LLM_PROVIDER", "vertex");
        std::env::set_var("QUIZZIFY_LLM_TEMPERATURE", "warm");
        std::env::set_var("QUIZZIFY_INDEX_BACKEND", "chroma");
    };
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.llm.provider, ProviderKind::Ollama);
    assert!((config.llm.temperature - 0.8).abs() < f32::EPSILON);
    assert_eq!(config.index.backend, IndexBackend::Memory);
}

#[test]
#[serial]
fn api_key_goes_to_secrets() {
    clear_env();
    let mut config = Config::default();

    unsafe { std::env::set_var("QUIZZIFY_OPENAI_API_KEY", "sk-test") };
    config.apply_env_overrides();
    clear_env();

    let key = config.secrets.openai_api_key.as_ref().unwrap();
    assert_eq!(key.expose(), "sk-test");
    assert_eq!(format!("{key:?}"), "[REDACTED]");
    assert!(!config.to_toml().unwrap().contains("sk-test"));
}

#[test]
#[serial]
fn empty_persist_dir_disables_snapshots() {
    clear_env();
    let mut config = Config::default();
    unsafe { std::env::set_var("QUIZZIFY_INDEX_PERSIST_DIR", "") };
    config.apply_env_overrides();
    clear_env();
    assert!(config.index.persist_dir.is_none());
    assert!(config.index.builder_config().snapshot_dir.is_none());
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut config = Config::default();
    config.chunking.chunk_overlap = 2000;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.llm.temperature = 2.5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.llm.max_tokens = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.quiz.context_k = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.quiz.default_count = 11;
    assert!(config.validate().is_err());
}

#[test]
fn splitter_and_builder_configs_follow_sections() {
    let mut config = Config::default();
    config.chunking.chunk_size = 300;
    config.index.collection_prefix = "bio".into();

    let splitter = config.chunking.splitter_config();
    assert_eq!(splitter.chunk_size, 300);
    assert_eq!(splitter.chunk_overlap, 200);

    let builder = config.index.builder_config();
    assert_eq!(builder.collection_prefix, "bio");
    assert_eq!(builder.snapshot_dir, config.index.persist_dir);
}

#[test]
fn default_config_round_trips_through_toml() {
    let rendered = Config::default().to_toml().unwrap();
    let parsed: Config = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed.llm.model, "mistral:7b");
    assert_eq!(parsed.chunking.chunk_size, 1000);
}

#[test]
#[serial]
fn config_path_priority() {
    clear_env();
    assert_eq!(
        resolve_config_path(Some(Path::new("cli.toml"))),
        PathBuf::from("cli.toml")
    );
    assert_eq!(resolve_config_path(None), PathBuf::from("config/default.toml"));

    unsafe { std::env::set_var("QUIZZIFY_CONFIG", "env.toml") };
    assert_eq!(resolve_config_path(None), PathBuf::from("env.toml"));
    assert_eq!(
        resolve_config_path(Some(Path::new("cli.toml"))),
        PathBuf::from("cli.toml")
    );
    clear_env();
}

#[test]
#[serial]
fn shipped_default_config_is_valid() {
    clear_env();
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
    let config = Config::load(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.llm.model, "mistral:7b");
    assert_eq!(config.timeouts.llm_seconds, 60);
}
