use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};
use quizzify_core::config::{Config, IndexBackend, OpenAiConfig, ProviderKind};

#[derive(Default)]
#[cfg_attr(test, derive(Clone))]
pub(crate) struct WizardState {
    pub(crate) provider: Option<ProviderKind>,
    pub(crate) base_url: Option<String>,
    pub(crate) model: Option<String>,
    pub(crate) embedding_model: Option<String>,
    pub(crate) chunk_size: Option<usize>,
    pub(crate) chunk_overlap: Option<usize>,
    pub(crate) backend: IndexBackend,
    pub(crate) persist_dir: Option<String>,
    pub(crate) qdrant_url: Option<String>,
}

pub fn run(output: Option<PathBuf>) -> anyhow::Result<()> {
    println!("quizzify init - configuration wizard\n");

    let mut state = WizardState::default();
    step_llm(&mut state)?;
    step_chunking(&mut state)?;
    step_index(&mut state)?;
    step_review_and_write(&state, output)?;

    Ok(())
}

fn step_llm(state: &mut WizardState) -> anyhow::Result<()> {
    println!("== Step 1/4: Language model ==\n");

    let providers = ["Ollama (local)", "OpenAI-compatible (API)"];
    let selection = Select::new()
        .with_prompt("Select LLM provider")
        .items(providers)
        .default(0)
        .interact()?;

    match selection {
        0 => {
            state.provider = Some(ProviderKind::Ollama);
            state.base_url = Some(
                Input::new()
                    .with_prompt("Ollama base URL")
                    .default("http://localhost:11434".into())
                    .interact_text()?,
            );
            state.model = Some(
                Input::new()
                    .with_prompt("Model name")
                    .default("mistral:7b".into())
                    .interact_text()?,
            );
            state.embedding_model = Some(
                Input::new()
                    .with_prompt("Embedding model")
                    .default("qwen3-embedding".into())
                    .interact_text()?,
            );
        }
        _ => {
            state.provider = Some(ProviderKind::OpenAi);
            state.base_url = Some(
                Input::new()
                    .with_prompt("Base URL")
                    .default("https://api.openai.com/v1".into())
                    .interact_text()?,
            );
            state.model = Some(
                Input::new()
                    .with_prompt("Model name")
                    .default("gpt-4o-mini".into())
                    .interact_text()?,
            );
            state.embedding_model = Some(
                Input::new()
                    .with_prompt("Embedding model")
                    .default("text-embedding-3-small".into())
                    .interact_text()?,
            );
        }
    }

    println!();
    Ok(())
}

fn step_chunking(state: &mut WizardState) -> anyhow::Result<()> {
    println!("== Step 2/4: Chunking ==\n");

    let size: usize = Input::new()
        .with_prompt("Chunk size (characters)")
        .default(1000)
        .interact_text()?;
    let overlap: usize = Input::new()
        .with_prompt("Chunk overlap (characters)")
        .default(200.min(size))
        .validate_with(|v: &usize| -> Result<(), String> {
            if *v <= size {
                Ok(())
            } else {
                Err(format!("overlap must not exceed the chunk size ({size})"))
            }
        })
        .interact_text()?;
    state.chunk_size = Some(size);
    state.chunk_overlap = Some(overlap);

    println!();
    Ok(())
}

fn step_index(state: &mut WizardState) -> anyhow::Result<()> {
    println!("== Step 3/4: Index ==\n");

    let backends = ["In-memory with snapshot file", "Qdrant"];
    let selection = Select::new()
        .with_prompt("Select index backend")
        .items(backends)
        .default(0)
        .interact()?;

    if selection == 0 {
        state.backend = IndexBackend::Memory;
        state.persist_dir = Some(
            Input::new()
                .with_prompt("Snapshot directory")
                .default(".quizzify/index".into())
                .interact_text()?,
        );
    } else {
        state.backend = IndexBackend::Qdrant;
        state.qdrant_url = Some(
            Input::new()
                .with_prompt("Qdrant URL")
                .default("http://localhost:6334".into())
                .interact_text()?,
        );
    }

    println!();
    Ok(())
}

pub(crate) fn build_config(state: &WizardState) -> Config {
    let mut config = Config::default();
    let provider = state.provider.unwrap_or(ProviderKind::Ollama);
    config.llm.provider = provider;

    match provider {
        ProviderKind::Ollama => {
            if let Some(url) = &state.base_url {
                config.llm.base_url.clone_from(url);
            }
            if let Some(model) = &state.model {
                config.llm.model.clone_from(model);
            }
            if let Some(embedding) = &state.embedding_model {
                config.llm.embedding_model.clone_from(embedding);
            }
        }
        ProviderKind::OpenAi => {
            config.llm.openai = Some(OpenAiConfig {
                base_url: state
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.openai.com/v1".into()),
                model: state.model.clone().unwrap_or_else(|| "gpt-4o-mini".into()),
                embedding_model: state.embedding_model.clone(),
            });
        }
    }

    if let Some(size) = state.chunk_size {
        config.chunking.chunk_size = size;
    }
    if let Some(overlap) = state.chunk_overlap {
        config.chunking.chunk_overlap = overlap;
    }

    config.index.backend = state.backend;
    match state.backend {
        IndexBackend::Memory => {
            if let Some(dir) = &state.persist_dir {
                config.index.persist_dir = Some(PathBuf::from(dir));
            }
        }
        IndexBackend::Qdrant => {
            if let Some(url) = &state.qdrant_url {
                config.index.qdrant_url.clone_from(url);
            }
        }
    }

    config
}

fn step_review_and_write(state: &WizardState, output: Option<PathBuf>) -> anyhow::Result<()> {
    println!("== Step 4/4: Review & Write ==\n");

    let config = build_config(state);
    config.validate()?;
    let toml_str = config.to_toml()?;

    println!("--- Generated config ---");
    println!("{toml_str}");
    println!("------------------------\n");

    let default_path = PathBuf::from("config/default.toml");
    let path = output.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Write config to")
            .default(default_path.display().to_string())
            .interact_text()
            .map(PathBuf::from)
            .unwrap_or(default_path)
    });

    if path.exists() {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &toml_str)?;
    println!("Config written to {}", path.display());

    print_next_steps(state, &path);
    Ok(())
}

fn api_key_env_var(kind: ProviderKind) -> Option<&'static str> {
    match kind {
        ProviderKind::OpenAi => Some("QUIZZIFY_OPENAI_API_KEY"),
        ProviderKind::Ollama => None,
    }
}

fn print_next_steps(state: &WizardState, path: &std::path::Path) {
    println!("\nNext steps:");
    let mut step = 1;
    if let Some(var) = state.provider.and_then(api_key_env_var) {
        println!("  {step}. Add to your shell profile: export {var}=\"<your-key>\"");
        step += 1;
    }
    println!(
        "  {step}. Index documents: quizzify --config {} ingest <files>",
        path.display()
    );
    println!(
        "  {}. Take a quiz: quizzify --config {} quiz --topic <topic> --count 5",
        step + 1,
        path.display()
    );
}
