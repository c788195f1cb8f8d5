use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{GatewayClient, forms};

#[derive(Parser)]
#[command(name = "manual-assist")]
#[command(about = "Upload, update and search manufacturing documents", long_about = None)]
struct Cli {
    /// Base URL of the gateway
    #[arg(long, env = "GATEWAY_URL", default_value = "http://localhost:8000")]
    gateway_url: String,

    /// Seconds to wait for the gateway before giving up
    #[arg(long, env = "GATEWAY_TIMEOUT_SECS", default_value_t = 300)]
    timeout_secs: u64,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a document and print its extracted text
    Upload {
        path: PathBuf,
    },

    /// Ask the model for an updated version of a document
    Update {
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the document text from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Search the document index
    Search {
        query: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            // Form errors already hold the gateway's detail.
            let message = match e.downcast_ref::<forms::FormError>() {
                Some(form_error) => form_error.to_string(),
                None => format!("{:#}", e),
            };
            eprintln!("{}", forms::error_banner(&message));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    let client = GatewayClient::new(&cli.gateway_url, Duration::from_secs(cli.timeout_secs))?;

    let output = match cli.command {
        Commands::Upload { path } => forms::upload(&client, &path).await?,
        Commands::Update { text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Could not read {}", path.display()))?,
                (None, None) => String::new(),
            };
            forms::update(&client, &text).await?
        }
        Commands::Search { query } => forms::search(&client, &query).await?,
    };

    Ok(output)
}

fn init_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "cli=debug" } else { "warn" }));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();
}
