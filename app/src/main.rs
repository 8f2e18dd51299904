//! `scrag`: ingest documents and ask questions answered by the self-correcting pipeline.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use scrag_ai::context::AppContext;
use scrag_ai::corpus::Corpus;
use scrag_ai::ollama::OllamaClient;
use scrag_ai::pipeline::Pipeline;
use scrag_core::config::AppConfig;
use scrag_core::error::AppError;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

const DEMO_DOC_NAME: &str = "sample_ai_act.txt";
const DEMO_DOC: &str = include_str!("../../fixtures/demo/sample_ai_act.txt");
const DEMO_QUESTION: &str = "What AI practices are prohibited under the EU AI Act?";

#[derive(Parser)]
#[command(name = "scrag")]
#[command(about = "Self-correcting retrieval QA over local documents", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "SCRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add .txt/.md files (or directories of them) to the knowledge base
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Ask a question
    Ask {
        question: String,

        /// Extra attempts after the first; defaults to the configured value
        #[arg(long)]
        max_retries: Option<u32>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show knowledge base and embedding server status
    Status,

    /// Seed the bundled EU AI Act sample, ingest it and ask a sample question
    Demo,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = %e.code, retryable = e.retryable, "{}", e.message);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut cfg = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        cfg.data_dir = dir;
    }

    match cli.command {
        Commands::Ingest { paths } => ingest(&cfg, &paths),
        Commands::Ask {
            question,
            max_retries,
            json,
        } => ask(&cfg, &question, max_retries, json),
        Commands::Status => status(&cfg),
        Commands::Demo => demo(&cfg),
    }
}

fn ingest(cfg: &AppConfig, paths: &[PathBuf]) -> Result<(), AppError> {
    let corpus = Corpus::from_config(cfg)?;
    let chunks = corpus.load(paths)?;
    if chunks == 0 {
        println!("No documents loaded; add .txt or .md files.");
    } else {
        println!("Indexed {chunks} chunks.");
    }
    Ok(())
}

fn ask(cfg: &AppConfig, question: &str, max_retries: Option<u32>, json: bool) -> Result<(), AppError> {
    let pipeline = Pipeline::new(AppContext::from_config(cfg)?);
    let retries = max_retries.unwrap_or(cfg.pipeline.default_max_retries);
    let result = pipeline.query(question, retries)?;
    if json {
        output::print_json(&result)
    } else {
        output::print_result(&result);
        Ok(())
    }
}

fn status(cfg: &AppConfig) -> Result<(), AppError> {
    let corpus = Corpus::from_config(cfg)?;
    let index = corpus.status()?;
    let sources = corpus.evidence().list_sources()?.len();
    let reachable = OllamaClient::new(&cfg.embeddings.ollama_url).and_then(|c| c.health_check());
    output::print_status(&index, sources, reachable);
    Ok(())
}

fn demo(cfg: &AppConfig) -> Result<(), AppError> {
    // Build the oracle first so a missing key fails before anything is written.
    let ctx = AppContext::from_config(cfg)?;

    let docs_dir = cfg.data_dir.join("docs");
    fs::create_dir_all(&docs_dir).map_err(|e| {
        AppError::new("CLI_DEMO_FAILED", "Failed to create demo directory")
            .with_details(format!("path={}; err={}", docs_dir.display(), e))
    })?;
    let doc_path = docs_dir.join(DEMO_DOC_NAME);
    if !doc_path.exists() {
        fs::write(&doc_path, DEMO_DOC).map_err(|e| {
            AppError::new("CLI_DEMO_FAILED", "Failed to write demo document")
                .with_details(format!("path={}; err={}", doc_path.display(), e))
        })?;
        info!(path = %doc_path.display(), "created sample document");
    }

    let corpus = Corpus::from_config(cfg)?;
    if corpus.load(&[docs_dir])? == 0 {
        return Err(AppError::new("CLI_DEMO_FAILED", "No documents loaded for the demo"));
    }

    println!("Question: {DEMO_QUESTION}");
    let result = Pipeline::new(ctx).query(DEMO_QUESTION, cfg.pipeline.default_max_retries)?;
    output::print_result(&result);
    Ok(())
}
