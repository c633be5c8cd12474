//! cwlstash: list and upload objects on an S3-compatible endpoint.
//!
//! Endpoint and credentials come from BOTO3_ENDPOINT_URL, AWS_ACCESS_KEY_ID,
//! AWS_SECRET_ACCESS_KEY and MINIO_BUCKET1 (a `.env` file is honoured).

use clap::{Parser, Subcommand};
use cwlstash_cli::{init_tracing, list_objects, send_cwl_output, OutputFormat};
use cwlstash_core::Config;

#[derive(Parser)]
#[command(name = "cwlstash", about = "List and upload objects on an S3-compatible endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every object in every bucket
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Upload the File outputs of a CWL output manifest to the configured bucket
    Send {
        /// Path to the JSON manifest
        manifest: std::path::PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::List { format } => list_objects(&config, format).await,
        Commands::Send { manifest } => send_cwl_output(&config, &manifest).await.map(|_| ()),
    }
}
