use anyhow::{Context, Result};
use book_reels::config::{Config, RendererKind};
use book_reels::{init, pipeline, reel};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "book-reels", about = "Turn book metadata into short vertical videos")]
struct Cli {
    /// JSON config file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch, dedupe and save book metadata.
    Fetch {
        #[arg(short, long, default_value = "productivity")]
        query: String,
        #[arg(short = 'n', long)]
        max_results: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize the saved books.
    Summarize {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Voice every saved summary.
    Voice,
    /// Render a reel for every voiced summary.
    Render,
    /// Fetch, then summarize, voice and render.
    Run {
        #[arg(short, long, default_value = "productivity")]
        query: String,
        #[arg(short = 'n', long)]
        max_results: Option<usize>,
        #[arg(short, long, default_value_t = 1)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init::init_tracing();
    let cli = Cli::parse();

    let cfg = Config::load_or_default(&cli.config).await?;
    init::ensure_directories(&cfg).await?;

    match cli.command {
        Command::Fetch {
            query,
            max_results,
            output,
        } => {
            pipeline::run_ingest(&cfg, &query, max_results, output.as_deref())
                .await
                .context("fetch failed")?;
        }
        Command::Summarize { limit } => {
            reel::run_summarize(&cfg, limit).await.context("summarize failed")?;
        }
        Command::Voice => {
            reel::run_voice(&cfg).await.context("voice generation failed")?;
        }
        Command::Render => {
            warn_missing_ffmpeg(&cfg).await;
            reel::run_render(&cfg).await.context("render failed")?;
        }
        Command::Run {
            query,
            max_results,
            limit,
        } => {
            warn_missing_ffmpeg(&cfg).await;
            pipeline::run_ingest(&cfg, &query, max_results, None)
                .await
                .context("fetch failed")?;
            let videos = reel::run_reels(&cfg, Some(limit)).await?;
            for video in videos {
                println!("Generated video: {}", video.path.display());
            }
        }
    }

    Ok(())
}

async fn warn_missing_ffmpeg(cfg: &Config) {
    if !init::check_ffmpeg().await {
        if cfg.renderer == RendererKind::Ffmpeg {
            tracing::warn!("FFmpeg not found in PATH. Please install FFmpeg.");
        } else {
            tracing::warn!("FFmpeg not found in PATH; Creatomate renders will stay silent.");
        }
    }
}
