mod init;
mod session;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use quizzify_core::bootstrap::{AppBuilder, health_check};
use quizzify_core::{QuizError, QuizNavigator, QuizRequest};
use quizzify_llm::LlmProvider;
use quizzify_llm::any::AnyProvider;
use quizzify_memory::document::{DocumentStore, IndexSummary, IngestionPipeline, loader_for_path};
use quizzify_memory::{MemoryError, Retriever};

#[derive(Debug, Parser)]
#[command(name = "quizzify", version)]
#[command(about = "Generate multiple-choice quizzes from your documents")]
struct Cli {
    /// Config file (falls back to QUIZZIFY_CONFIG, then config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load documents and rebuild the index from them
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show the indexed chunks most similar to a query
    Query {
        text: String,
        #[arg(short, default_value_t = 4)]
        k: usize,
        /// Ingest these files first instead of using the persisted index
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Generate a quiz on a topic and browse it
    Quiz {
        /// Empty means "General Knowledge"
        #[arg(long, default_value = "")]
        topic: String,
        /// Number of questions, 1 to 10
        #[arg(long)]
        count: Option<usize>,
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        /// Print the question bank as JSON instead of starting a session
        #[arg(long)]
        json: bool,
    },
    /// Write a config file interactively
    Init {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber();

    match cli.command {
        Command::Init { output } => init::run(output),
        Command::Ingest { files } => {
            let app = AppBuilder::from_path(cli.config.as_deref())?;
            let (_, pipeline) = prepare(&app).await?;
            if app.config().index.persist_dir.is_none() {
                tracing::warn!("index.persist_dir is unset, the index will not outlive this run");
            }
            if let Some(summary) = ingest(&pipeline, &files).await? {
                println!(
                    "Indexed {} chunks from {} pages ({} duplicates dropped) into {}",
                    summary.chunks, summary.pages, summary.duplicates, summary.collection
                );
            }
            Ok(())
        }
        Command::Query { text, k, files } => {
            let app = AppBuilder::from_path(cli.config.as_deref())?;
            let (provider, pipeline) = prepare(&app).await?;
            if !files.is_empty() && ingest(&pipeline, &files).await?.is_none() {
                return Ok(());
            }
            query(&pipeline, provider, &text, k).await
        }
        Command::Quiz {
            topic,
            count,
            files,
            json,
        } => {
            let app = AppBuilder::from_path(cli.config.as_deref())?;
            let count = count.unwrap_or(app.config().quiz.default_count);
            let request = QuizRequest::new(&topic, count)?;
            let (provider, pipeline) = prepare(&app).await?;
            if !files.is_empty() && ingest(&pipeline, &files).await?.is_none() {
                return Ok(());
            }

            let assembler = app.build_assembler(provider, &pipeline);
            let quiz = match assembler.assemble(&request).await {
                Ok(quiz) => quiz,
                Err(QuizError::NoIndex) => {
                    eprintln!("warning: no index has been built yet, run `quizzify ingest <files>` first");
                    return Ok(());
                }
                Err(e) => return Err(e).context("quiz generation failed"),
            };

            if quiz.report.is_partial() {
                eprintln!(
                    "warning: generated {} of {} requested questions ({} malformed, {} duplicates, {} failed)",
                    quiz.report.accepted,
                    quiz.report.requested,
                    quiz.report.malformed,
                    quiz.report.duplicates,
                    quiz.report.failed
                );
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&quiz.bank)?);
                return Ok(());
            }
            session::run(QuizNavigator::new(quiz.bank), &quiz.topic)
        }
    }
}

async fn prepare(app: &AppBuilder) -> anyhow::Result<(AnyProvider, IngestionPipeline<AnyProvider>)> {
    tracing::debug!(path = %app.config_path().display(), "configuration loaded");
    let provider = app.build_provider()?;
    health_check(&provider).await;
    let pipeline = app.build_pipeline(provider.clone()).await?;
    Ok((provider, pipeline))
}

/// Load `files` and rebuild the index from them. Returns `None` when the
/// files held no text, after warning on stderr.
async fn ingest<P: LlmProvider>(
    pipeline: &IngestionPipeline<P>,
    files: &[PathBuf],
) -> anyhow::Result<Option<IndexSummary>> {
    let mut documents = DocumentStore::new();
    for path in files {
        let loader = loader_for_path(path)
            .with_context(|| format!("cannot load {}", path.display()))?;
        documents
            .ingest(loader.as_ref(), path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        tracing::info!(file = %path.display(), pages = documents.len(), "document loaded");
    }

    match pipeline.rebuild(&documents).await {
        Ok(summary) => Ok(Some(summary)),
        Err(MemoryError::EmptyInput) => {
            eprintln!("warning: no text found in the given documents, index left unchanged");
            Ok(None)
        }
        Err(e) => Err(e).context("failed to build index"),
    }
}

async fn query<P: LlmProvider + Clone>(
    pipeline: &IngestionPipeline<P>,
    provider: P,
    text: &str,
    k: usize,
) -> anyhow::Result<()> {
    let retriever = pipeline.retriever(provider);
    let hits = match retriever.retrieve(text, k).await {
        Ok(hits) => hits,
        Err(MemoryError::NoIndex) => {
            eprintln!("warning: no index has been built yet, run `quizzify ingest <files>` first");
            return Ok(());
        }
        Err(e) => return Err(e).context("query failed"),
    };

    if hits.is_empty() {
        println!("no matches");
    }
    for (rank, hit) in hits.iter().enumerate() {
        let meta = &hit.chunk.metadata;
        println!(
            "{}. {} p.{} #{} (score {:.3})\n{}\n",
            rank + 1,
            meta.source,
            meta.page_number,
            meta.chunk_index,
            hit.score,
            hit.chunk.text
        );
    }
    Ok(())
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::CommandFactory;
    use quizzify_core::Config;
    use quizzify_llm::mock::MockProvider;

    use super::*;

    fn app(persist_dir: Option<PathBuf>) -> AppBuilder {
        let mut config = Config::default();
        config.index.persist_dir = persist_dir;
        config.chunking.chunk_size = 60;
        config.chunking.chunk_overlap = 0;
        AppBuilder::from_config(config)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_quiz_flags() {
        let cli = Cli::try_parse_from([
            "quizzify", "--config", "q.toml", "quiz", "--topic", "Tides", "--count", "3", "--json",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("q.toml")));
        match cli.command {
            Command::Quiz {
                topic, count, json, ..
            } => {
                assert_eq!(topic, "Tides");
                assert_eq!(count, Some(3));
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn quiz_topic_defaults_to_empty() {
        let cli = Cli::try_parse_from(["quizzify", "quiz"]).unwrap();
        assert!(matches!(cli.command, Command::Quiz { ref topic, count: None, .. } if topic.is_empty()));
    }

    #[test]
    fn ingest_requires_files() {
        assert!(Cli::try_parse_from(["quizzify", "ingest"]).is_err());
        let cli = Cli::try_parse_from(["quizzify", "ingest", "a.pdf", "b.txt"]).unwrap();
        assert!(matches!(cli.command, Command::Ingest { ref files } if files.len() == 2));
    }

    #[test]
    fn query_k_defaults_to_four() {
        let cli = Cli::try_parse_from(["quizzify", "query", "photosynthesis"]).unwrap();
        assert!(matches!(cli.command, Command::Query { k: 4, .. }));
    }

    #[tokio::test]
    async fn ingest_text_files_builds_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Plate tectonics shapes continents.\x0CEarthquakes release stress.")
            .unwrap();

        let app = app(Some(dir.path().join("index")));
        let pipeline = app.build_pipeline(MockProvider::default()).await.unwrap();
        let summary = ingest(&pipeline, &[path]).await.unwrap().unwrap();

        assert_eq!(summary.pages, 2);
        assert_eq!(summary.chunks, 2);
        assert!(dir.path().join("index").join("index.json").exists());
    }

    #[tokio::test]
    async fn ingest_blank_file_warns_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "  \n\n").unwrap();

        let pipeline = app(None)
            .build_pipeline(MockProvider::default())
            .await
            .unwrap();
        assert!(ingest(&pipeline, &[path]).await.unwrap().is_none());
        assert!(!pipeline.active().is_built());
    }

    #[tokio::test]
    async fn ingest_unsupported_extension_errors() {
        let pipeline = app(None)
            .build_pipeline(MockProvider::default())
            .await
            .unwrap();
        let err = ingest(&pipeline, &[PathBuf::from("slides.pptx")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("slides.pptx"));
    }

    #[tokio::test]
    async fn query_without_index_is_not_an_error() {
        let pipeline = app(None)
            .build_pipeline(MockProvider::default())
            .await
            .unwrap();
        assert!(query(&pipeline, MockProvider::default(), "rocks", 3).await.is_ok());
    }
}
