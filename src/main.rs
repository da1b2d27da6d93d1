use anyhow::{Context, Result};
use askdocs::{config::Config, AskService};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "askdocs")]
#[command(about = "Index documents, web pages and spreadsheets, then ask questions grounded in them")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to settings.toml (defaults to config/settings.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Meilisearch URL (overrides config)
    #[arg(long, global = true)]
    meili_url: Option<String>,

    /// Meilisearch API key (overrides config and env)
    #[arg(long, global = true)]
    meili_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a text document
    #[command(name = "add")]
    Add {
        /// Document id; re-adding the same id overwrites it
        #[arg(long)]
        id: Option<String>,
        /// Document text
        #[arg(long)]
        content: String,
    },
    /// Fetch a web page and index its visible text
    #[command(name = "add-url")]
    AddUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Index a spreadsheet (xlsx, xls, xlsb, ods), one document per file
    #[command(name = "upload-excel")]
    UploadExcel {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Ask a question answered from indexed documents
    #[command(name = "ask")]
    Ask {
        #[arg(value_name = "QUERY")]
        query: String,
    },
    /// Ask a question answered strictly from indexed spreadsheets
    #[command(name = "ask-excel")]
    AskExcel {
        #[arg(value_name = "QUERY")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load().context("Failed to load config")?,
    };
    if let Some(url) = cli.meili_url {
        config.meilisearch.url = url;
    }
    if let Some(key) = cli.meili_key {
        config.meilisearch.api_key = Some(key);
    }

    let service = AskService::connect(Arc::new(config))
        .await
        .context("Failed to initialize Meilisearch and LLM providers")?;

    match cli.command {
        Commands::Add { id, content } => {
            let ack = service.add(id, content).await.context("Failed to index document")?;
            println!("{}", ack);
        }
        Commands::AddUrl { url } => {
            let ack = service
                .add_from_url(&url)
                .await
                .with_context(|| format!("Failed to index {}", url))?;
            println!("{}", ack);
        }
        Commands::UploadExcel { file } => {
            let ack = service
                .upload_spreadsheet_file(&file)
                .await
                .with_context(|| format!("Failed to index {}", file.display()))?;
            println!("{}", ack);
        }
        Commands::Ask { query } => {
            let answer = service.ask(&query).await.context("Failed to answer query")?;
            println!("{}", answer);
        }
        Commands::AskExcel { query } => {
            let answer = service
                .query_excel(&query)
                .await
                .context("Failed to answer spreadsheet query")?;
            println!("{}", answer);
        }
    }

    Ok(())
}
