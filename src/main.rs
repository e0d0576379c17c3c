use anyhow::{Context, Result};
use citation_retrieval::config::{find_config_file, get_config, load_config, Config};
use citation_retrieval::utils::TermExtractor;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Citation Retrieval - answer biomedical questions with ranked PubMed citations
#[derive(Parser, Debug)]
#[command(name = "citation-retrieval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Answer biomedical questions with a ranked list of PubMed citations", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Plain)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (overrides the configuration)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Plain text citation blocks
    Plain,
    /// JSON object: {"citations": [...]}
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Retrieve ranked citations for a question
    #[command(alias = "c")]
    Cite {
        /// Free-text question
        query: String,

        /// Number of citations to return (default from configuration, normally 3)
        #[arg(long, short = 'n')]
        num_citations: Option<usize>,
    },

    /// Show the search terms extracted from a question
    #[command(alias = "t")]
    Terms {
        /// Free-text question
        query: String,
    },
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Citation Retrieval - Environment Variables");
    println!();
    println!("API Keys:");
    println!("  NCBI_API_KEY                                  NCBI E-utilities API key (required for searches)");
    println!();
    println!("Retrieval:");
    println!("  CITATION_RETRIEVAL__RETRIEVAL__DEFAULT_CITATIONS  Citations per question (default: 3)");
    println!("  CITATION_RETRIEVAL__RETRIEVAL__OVERFETCH_FACTOR   Candidates fetched per citation (default: 2)");
    println!();
    println!("HTTP:");
    println!("  CITATION_RETRIEVAL__HTTP__TIMEOUT_SECS          Request timeout in seconds (default: 30)");
    println!("  CITATION_RETRIEVAL__HTTP__CONNECT_TIMEOUT_SECS  Connect timeout in seconds (default: 10)");
    println!("  CITATION_RETRIEVAL__HTTP__EUTILS_BASE_URL       E-utilities base URL");
    println!();
    println!("Retry:");
    println!("  CITATION_RETRIEVAL__RETRY__MAX_ATTEMPTS        Attempts per request (default: 2)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export NCBI_API_KEY=\"your-key-here\"");
    println!("  citation-retrieval cite \"Role of APOE in neurodegeneration\" -n 2");
}

fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = if quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("citation_retrieval={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)
            .with_context(|| format!("Failed to load config file {}", config_path.display()))?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)
            .with_context(|| format!("Failed to load config file {}", config_path.display()))?
    } else {
        get_config().context("Failed to load configuration from the environment")?
    };

    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }
    Ok(config)
}

fn render(citations: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Plain => Ok(citations.join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "citations": citations
        }))?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
        return Ok(());
    }

    init_logging(cli.verbose, cli.quiet);

    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Cite {
            query,
            num_citations,
        } => {
            let config = resolve_config(&cli)?;
            let count = num_citations.unwrap_or(config.retrieval.default_citations);
            let service = config
                .citation_service()
                .context("Failed to initialise the PubMed client")?;

            let citations = service.retrieve_and_rank_citations(query, count).await;
            println!("{}", render(&citations, cli.output)?);
        }
        Commands::Terms { query } => {
            let terms = TermExtractor::new().extract(query);
            match cli.output {
                OutputFormat::Plain => {
                    for term in terms.iter() {
                        println!("{}", term);
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&terms)?),
            }
        }
    }

    Ok(())
}
