//! Order-CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing::info;

use order_cli::{config_for, load_documents, run, save_documents, telemetry, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_tracing(&args.log_level, args.json_logs)?;

    let config = config_for(&args);
    let documents = load_documents(&args.data)?;
    info!(documents = documents.len(), command = ?args.command, "Running order maintenance");

    let (response, documents) = run(&args, config, documents).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if args.dump {
        println!("{}", serde_json::to_string_pretty(&documents)?);
    }
    if args.write && !response.failed {
        save_documents(&args.data, &documents)?;
        info!(path = %args.data.display(), "Documents written back");
    }

    if response.failed {
        std::process::exit(1);
    }
    Ok(())
}
