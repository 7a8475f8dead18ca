use super::{Config, IndexBackend, Secret};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_llm();
        self.apply_env_overrides_index();
    }

    fn apply_env_overrides_llm(&mut self) {
        if let Ok(v) = std::env::var("QUIZZIFY_LLM_PROVIDER") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.llm.provider = kind;
            } else {
                tracing::warn!("ignoring invalid QUIZZIFY_LLM_PROVIDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("QUIZZIFY_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("QUIZZIFY_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("QUIZZIFY_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("QUIZZIFY_LLM_TEMPERATURE")
            && let Ok(t) = v.parse::<f32>()
        {
            self.llm.temperature = t;
        }
        if let Ok(v) = std::env::var("QUIZZIFY_LLM_MAX_TOKENS")
            && let Ok(n) = v.parse::<u32>()
        {
            self.llm.max_tokens = n;
        }
        if let Ok(v) = std::env::var("QUIZZIFY_OPENAI_API_KEY")
            && !v.is_empty()
        {
            self.secrets.openai_api_key = Some(Secret::new(v));
        }
        if let Ok(v) = std::env::var("QUIZZIFY_QUIZ_CONTEXT_K")
            && let Ok(k) = v.parse::<usize>()
        {
            self.quiz.context_k = k;
        }
        if let Ok(v) = std::env::var("QUIZZIFY_TIMEOUT_LLM")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.llm_seconds = secs;
        }
    }

    fn apply_env_overrides_index(&mut self) {
        if let Ok(v) = std::env::var("QUIZZIFY_CHUNK_SIZE")
            && let Ok(n) = v.parse::<usize>()
        {
            self.chunking.chunk_size = n;
        }
        if let Ok(v) = std::env::var("QUIZZIFY_CHUNK_OVERLAP")
            && let Ok(n) = v.parse::<usize>()
        {
            self.chunking.chunk_overlap = n;
        }
        if let Ok(v) = std::env::var("QUIZZIFY_INDEX_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "memory" => self.index.backend = IndexBackend::Memory,
                "qdrant" => self.index.backend = IndexBackend::Qdrant,
                _ => tracing::warn!("ignoring invalid QUIZZIFY_INDEX_BACKEND value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("QUIZZIFY_INDEX_PERSIST_DIR") {
            self.index.persist_dir = if v.is_empty() { None } else { Some(v.into()) };
        }
        if let Ok(v) = std::env::var("QUIZZIFY_QDRANT_URL") {
            self.index.qdrant_url = v;
        }
    }
}
