use anyhow::Result;
use clap::Parser;
use cwlstash_cli::{init_tracing, list_objects, OutputFormat};
use cwlstash_core::Config;

#[derive(Parser, Debug)]
#[command(name = "list_objects")]
#[command(about = "Print `bucket key` for every object in every bucket on the configured endpoint")]
struct Args {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let _args = Args::parse();

    let config = Config::from_env();
    tracing::info!(endpoint_url = %config.endpoint_url, "Listing objects");

    list_objects(&config, OutputFormat::Plain).await
}
