use anyhow::Result;
use book_reels::config::Config;
use book_reels::{init, pipeline};
use clap::Parser;
use std::path::PathBuf;

/// Fetch book metadata for a topic and save it as JSON.
#[derive(Parser)]
#[command(name = "fetch-books")]
struct Args {
    /// Topic keyword searched at every provider.
    #[arg(default_value = "productivity")]
    query: String,
    #[arg(short = 'n', long)]
    max_results: Option<usize>,
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init::init_tracing();
    let args = Args::parse();

    let cfg = Config::load_or_default(&args.config).await?;
    let summary =
        pipeline::run_ingest(&cfg, &args.query, args.max_results, args.output.as_deref()).await?;

    if !summary.failures.is_empty() {
        let names: Vec<_> = summary.failures.iter().map(|f| f.provider.as_str()).collect();
        tracing::warn!(tag = "WARN", "Skipped providers: {}", names.join(", "));
    }
    Ok(())
}
