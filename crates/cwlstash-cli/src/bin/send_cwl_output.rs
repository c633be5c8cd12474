use anyhow::Result;
use clap::Parser;
use cwlstash_cli::{init_tracing, send_cwl_output};
use cwlstash_core::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "send_cwl_output")]
#[command(about = "Upload the File outputs listed in a CWL output JSON file")]
struct Args {
    /// Path to the JSON manifest written by the workflow runner
    manifest: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let config = Config::from_env();
    tracing::info!(
        endpoint_url = %config.endpoint_url,
        bucket = %config.bucket,
        manifest = %args.manifest.display(),
        "Sending CWL outputs"
    );

    send_cwl_output(&config, &args.manifest).await?;
    Ok(())
}
