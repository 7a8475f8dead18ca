//! Wiring shared by the binary: config loading, provider and store
//! construction, and the ingestion/quiz pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use quizzify_llm::any::AnyProvider;
use quizzify_llm::ollama::OllamaProvider;
use quizzify_llm::openai::OpenAiProvider;
use quizzify_llm::{GenerationParams, LlmProvider};
use quizzify_memory::document::{CharacterSplitter, IngestionPipeline};
use quizzify_memory::{InMemoryVectorStore, IndexRetriever, VectorIndexBuilder, VectorStore};

use crate::config::{Config, IndexBackend, ProviderKind, resolve_config_path};
use crate::quiz::{QuestionSynthesizer, QuizAssembler};

pub struct AppBuilder {
    config: Config,
    config_path: PathBuf,
}

impl AppBuilder {
    /// Resolve the config path, load it and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be parsed or holds invalid values.
    pub fn from_path(cli_path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = resolve_config_path(cli_path);
        let config = Config::load(&config_path)?;
        config.validate()?;
        Ok(Self {
            config,
            config_path,
        })
    }

    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            config_path: PathBuf::from("config/default.toml"),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// # Errors
    ///
    /// See [`create_provider`].
    pub fn build_provider(&self) -> anyhow::Result<AnyProvider> {
        create_provider(&self.config)
    }

    /// # Errors
    ///
    /// Returns an error if the selected backend cannot be constructed.
    pub fn build_store(&self) -> anyhow::Result<Arc<dyn VectorStore>> {
        match self.config.index.backend {
            IndexBackend::Memory => Ok(Arc::new(InMemoryVectorStore::new())),
            #[cfg(feature = "qdrant")]
            IndexBackend::Qdrant => {
                let ops = quizzify_memory::QdrantOps::new(&self.config.index.qdrant_url)
                    .context("failed to create Qdrant client")?;
                Ok(Arc::new(ops))
            }
            #[cfg(not(feature = "qdrant"))]
            IndexBackend::Qdrant => {
                anyhow::bail!("index backend qdrant not available (feature not enabled)")
            }
        }
    }

    /// Build the ingestion pipeline and reinstall the persisted index, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunking settings are invalid or the store
    /// cannot be constructed. A snapshot that fails to restore is only logged.
    pub async fn build_pipeline<P: LlmProvider>(
        &self,
        provider: P,
    ) -> anyhow::Result<IngestionPipeline<P>> {
        let splitter = CharacterSplitter::new(self.config.chunking.splitter_config())
            .context("invalid chunking configuration")?;
        let store = self.build_store()?;
        let builder = VectorIndexBuilder::new(
            provider,
            Arc::clone(&store),
            self.config.index.builder_config(),
        );
        let pipeline = IngestionPipeline::new(splitter, builder, store);

        if let Some(dir) = &self.config.index.persist_dir {
            match pipeline.restore(dir).await {
                Ok(Some(index)) => tracing::info!(
                    collection = index.collection(),
                    chunks = index.len(),
                    "restored persisted index"
                ),
                Ok(None) => {}
                Err(e) => tracing::warn!(dir = %dir.display(), "failed to restore index: {e:#}"),
            }
        }
        Ok(pipeline)
    }

    /// Assembler that retrieves from `pipeline`'s active index.
    #[must_use]
    pub fn build_assembler<P: LlmProvider + Clone>(
        &self,
        provider: P,
        pipeline: &IngestionPipeline<P>,
    ) -> QuizAssembler<P, IndexRetriever<P>> {
        let retriever = pipeline.retriever(provider.clone());
        let params = GenerationParams::default()
            .with_temperature(self.config.llm.temperature)
            .with_max_tokens(self.config.llm.max_tokens);
        let synthesizer = QuestionSynthesizer::new(provider, retriever)
            .with_context_k(self.config.quiz.context_k)
            .with_params(params)
            .with_timeout(Duration::from_secs(self.config.timeouts.llm_seconds));
        QuizAssembler::new(synthesizer)
    }
}

/// # Errors
///
/// Returns an error if the selected provider is missing its config section
/// or credentials.
pub fn create_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    match config.llm.provider {
        ProviderKind::Ollama => Ok(AnyProvider::Ollama(OllamaProvider::new(
            &config.llm.base_url,
            config.llm.model.clone(),
            config.llm.embedding_model.clone(),
        ))),
        ProviderKind::OpenAi => {
            let openai = config
                .llm
                .openai
                .as_ref()
                .context("llm.openai config section required for openai provider")?;
            let api_key = config
                .secrets
                .openai_api_key
                .as_ref()
                .context("QUIZZIFY_OPENAI_API_KEY not found")?;
            Ok(AnyProvider::OpenAi(OpenAiProvider::new(
                api_key.expose().to_owned(),
                openai.base_url.clone(),
                openai.model.clone(),
                openai.embedding_model.clone(),
            )))
        }
    }
}

pub async fn health_check(provider: &AnyProvider) {
    match provider {
        AnyProvider::Ollama(ollama) => match ollama.health_check().await {
            Ok(()) => tracing::info!("ollama health check passed"),
            Err(e) => tracing::warn!("ollama health check failed: {e:#}"),
        },
        other => {
            if !other.supports_embeddings() {
                tracing::warn!(
                    provider = other.name(),
                    "provider has no embedding model, indexing will fail"
                );
            }
        }
    }
}
