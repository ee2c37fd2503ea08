//! Pagescout - Agentic Page Fetcher
//!
//! Main entry point for the CLI application.

use clap::Parser;
use pagescout::{Config, PageFetcher};
use tracing_subscriber::EnvFilter;

/// Pagescout - Agentic Page Fetcher
#[derive(Parser, Debug)]
#[command(name = "pagescout")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL to fetch
    url: String,

    /// Setup instruction to run before capture (repeatable, order preserved)
    #[arg(long, short = 's')]
    setup: Vec<String>,

    /// Print the snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Run in headed browser mode (visible window)
    #[arg(long)]
    headed: bool,

    /// Skip a failed setup instruction instead of aborting the fetch
    #[arg(long)]
    skip_on_failure: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pagescout=info")),
        )
        .init();

    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if args.headed {
        config.browser.headed = true;
    }

    if args.skip_on_failure {
        config.fetcher.fail_fast = false;
    }

    let fetcher = PageFetcher::new(config)?;
    let snapshot = fetcher.fetch(&args.url, &args.setup).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("URL:     {}", snapshot.url);
        println!("Status:  {}", snapshot.status_code);
        println!("Headers: {}", snapshot.headers.len());
        println!("HTML:    {} bytes", snapshot.html.len());
    }

    Ok(())
}
