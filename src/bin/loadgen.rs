use anyhow::Result;
use clap::Parser;
use page_latency_monitor::{init_tracing, loadgen};

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    // Load .env before parsing so LOAD_* fallbacks can come from it.
    dotenvy::dotenv().ok();
    init_tracing();

    let config = loadgen::LoadConfig::parse();
    let report = loadgen::run(&config).await?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}
