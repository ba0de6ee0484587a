use anyhow::{anyhow, Context};
use std::path::Path;

use ragline::cli::init::{self, InitConfig, InitResult};
use ragline::cli::output::Output;
use ragline::cli::{Cli, Commands};
use ragline::db::MetadataFilter;
use ragline::rag::RagRetriever;
use ragline::types::IngestRequest;
use ragline::utils::config::{ConfigError, RagConfig, VectorStoreKind};
use ragline::utils::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Commands::Init { path, force } = &cli.command {
        let config = InitConfig {
            path: path.clone(),
            force: *force,
        };
        return match init::run(config, &output) {
            InitResult::Success | InitResult::AlreadyExists => Ok(()),
            InitResult::Error(e) => Err(anyhow!("init failed: {}", e)),
        };
    }

    let config = load_config(&cli.config, &output)?;
    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    init_tracing(level, config.logging.format);

    config
        .validate_env()
        .context("Provider credentials are missing")?;

    let retriever = RagRetriever::from_config(&config)
        .await
        .context("Failed to initialize the RAG pipeline")?;

    match cli.command {
        Commands::Ingest { files, texts, dir } => {
            if files.is_empty() && texts.is_empty() && dir.is_none() {
                output.warning("Nothing to ingest");
                output.hint("Pass --file, --text or --dir");
                return Ok(());
            }
            if config.vector_store.provider == VectorStoreKind::Memory {
                output.warning("The in-memory store is discarded when ragline exits");
            }

            output.header("Ingesting");
            if !files.is_empty() || !texts.is_empty() {
                let request = IngestRequest {
                    file_paths: files,
                    texts,
                    metadata: Vec::new(),
                };
                let report = retriever.ingest(request).await?;
                output.ingest_report(&report);
                warn_failed_files(&output, report.files_failed);
            }

            if let Some(dir) = dir {
                output.subheader(&format!("Directory {}", dir.display()));
                let (report, summary) = retriever.ingest_directory(&dir).await?;
                output.kv("documents", &summary.total_documents.to_string());
                for (doc_type, count) in &summary.by_type {
                    output.list_item(&format!("{}: {}", doc_type, count));
                }
                output.kv("total size", &format!("{:.2} MB", summary.total_size_mb()));
                output.kv("files failed", &report.files_failed.to_string());
                output.kv("chunks ingested", &report.chunks_ingested.to_string());
                warn_failed_files(&output, report.files_failed);
            }

            output.complete("Ingestion finished");
        }

        Commands::Search {
            query,
            top_k,
            filters,
        } => {
            let filter = parse_filter(&filters)?;
            let results = retriever.retrieve(&query, top_k, filter.as_ref()).await?;

            output.header(&format!("Results for \"{}\"", query));
            if results.is_empty() {
                output.info("No matching chunks");
            }
            for (i, result) in results.iter().enumerate() {
                output.search_result(i + 1, result);
            }
        }

        Commands::Ask {
            question,
            top_k,
            filters,
        } => {
            let filter = parse_filter(&filters)?;
            let response = retriever.query(&question, top_k, filter.as_ref()).await?;

            output.header("Answer");
            output.paragraph(&response.answer);

            let sources = response.unique_sources();
            if !sources.is_empty() {
                output.subheader(&format!("Sources ({} chunks)", response.num_sources));
                for source in &sources {
                    output.list_item(source);
                }
            }
        }

        Commands::Stats => {
            output.header("Collection");
            match retriever.get_stats().await {
                Some(info) => output.collection_info(&info),
                None => output.warning("Collection statistics are unavailable"),
            }
        }

        // handled before the pipeline starts
        Commands::Init { .. } => {}
    }

    Ok(())
}

/// Load the config file, falling back to defaults when it does not exist.
fn load_config(path: &Path, output: &Output) -> anyhow::Result<RagConfig> {
    match RagConfig::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            output.warning(&format!(
                "{} not found, using built-in defaults",
                path.display()
            ));
            output.hint("Run 'ragline init' to create one");
            Ok(RagConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

fn warn_failed_files(output: &Output, failed: usize) {
    if failed > 0 {
        output.warning(&format!(
            "{} file(s) could not be processed, see the log for details",
            failed
        ));
    }
}

fn parse_filter(raw: &[String]) -> anyhow::Result<Option<MetadataFilter>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let filter = MetadataFilter::parse_all(raw).context("Invalid --filter")?;
    Ok(Some(filter))
}
