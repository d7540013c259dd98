//! Bid Analyser CLI - bid and tender document analysis
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use bid_analyser::session::{PipelineSettings, Session};
use bid_analyser::{export, ui, Config, Document, LlmClient};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bid-analyser")]
#[command(author, version, about = "Bid and tender document analysis with LLMs", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Path to a config file (defaults to bid-analyser.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (the default)
    Interactive {
        /// Document to load on start
        file: Option<PathBuf>,
    },
    /// Extract key information from a document
    Summarise {
        /// PDF or text file
        file: PathBuf,
        /// Show the extracted text instead of a summary
        #[arg(long)]
        raw: bool,
        /// Save the summary as a timestamped text file in DIR
        #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
        export: Option<PathBuf>,
    },
    /// Ask a question about a document
    Ask {
        /// PDF or text file
        file: PathBuf,
        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Show document statistics and chunk layout
    Stats {
        /// PDF or text file
        file: PathBuf,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "bid_analyser=debug,warn"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Some(Commands::Summarise { file, raw, export }) => {
            let document = Document::open(&file)?;

            if raw {
                println!("\n=== {} ===\n", document.name);
                println!("{}", document.text);
                println!("\n--- Extracted {} characters ---", document.text.len());
                return Ok(());
            }

            ui::warn_if_no_api_key(&config);
            let settings = PipelineSettings::from_config(&config)?;
            let client = LlmClient::from_config(&config.llm)?;
            let mut session = Session::new();
            let loaded = session.load(document, &settings.splitter);
            println!(
                "Summarising {} characters in {} chunk(s)...\n",
                loaded.stats.chars,
                loaded.chunks.len()
            );

            let summary = session.summarize(&client, &settings).await;
            ui::print_summary(summary);

            if let Some(dir) = export {
                let path = export::write_summary(&dir, summary, &chrono::Local::now())?;
                println!("Saved {}", path.display());
            }
        }
        Some(Commands::Ask { file, question }) => {
            let question = question.join(" ");
            ui::warn_if_no_api_key(&config);
            let settings = PipelineSettings::from_config(&config)?;
            let client = LlmClient::from_config(&config.llm)?;
            let mut session = Session::new();
            session.load(Document::open(&file)?, &settings.splitter);

            let answer = session.ask(&client, &settings, &question).await;
            ui::print_answer(&question, &answer);
        }
        Some(Commands::Stats { file }) => {
            let settings = PipelineSettings::from_config(&config)?;
            let mut session = Session::new();
            let loaded = session.load(Document::open(&file)?, &settings.splitter);
            ui::print_document_info(loaded);
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "bid-analyser",
                &mut std::io::stdout(),
            );
        }
        Some(Commands::Interactive { file }) => ui::run(&config, file).await?,
        None => ui::run(&config, None).await?,
    }

    Ok(())
}
