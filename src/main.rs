use clap::{Parser, Subcommand};
use tracing::error;

use chrono::{Local, NaiveDate};
use crash_reporter::config::Config;
use crash_reporter::error::{ReportError, Result};
use crash_reporter::feed::HttpFeedClient;
use crash_reporter::logging;
use crash_reporter::pipeline;
use crash_reporter::publish::{FileSink, HttpPublisher, PublisherPort};

#[derive(Parser)]
#[command(name = "crash_reporter")]
#[command(about = "Weekly traffic-crash statistics reporter")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and publish the weekly report
    Run {
        /// Reference date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Write the artifact to the output directory instead of publishing
        #[arg(long)]
        dry_run: bool,
    },
    /// Compose the report and write it to the output directory, never publish
    Preview {
        /// Reference date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
    },
}

fn reference_date(arg: Option<String>) -> Result<NaiveDate> {
    match arg {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|e| ReportError::Config(format!("invalid --date '{raw}': {e}"))),
        None => Ok(Local::now().date_naive()),
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run { date, dry_run } => {
            let reference = reference_date(date)?;
            println!("🚦 Running weekly crash report for reference date {reference}...");

            let feed = HttpFeedClient::new(&config.feed);
            let publisher: Box<dyn PublisherPort> = if dry_run {
                println!("   (dry run: artifact goes to {})", config.publish.output_dir);
                Box::new(FileSink::new(&config.publish.output_dir))
            } else {
                Box::new(HttpPublisher::new(&config.publish))
            };

            let receipt = pipeline::run(reference, &config, &feed, publisher.as_ref()).await?;
            println!("✅ Published: {}", receipt.id);
        }
        Commands::Preview { date } => {
            let reference = reference_date(date)?;
            println!("🔍 Composing preview for reference date {reference}...");

            let feed = HttpFeedClient::new(&config.feed);
            let (artifact, stats, window) =
                pipeline::compose_report(reference, &config, &feed).await?;
            let sink = FileSink::new(&config.publish.output_dir);
            let receipt = sink.publish(&artifact).await?;

            println!("\n📊 Report for {window}:");
            println!("   Weekly: {} crashes, {} fatalities, {} injuries",
                stats.weekly_crashes, stats.weekly_fatalities, stats.weekly_injuries);
            println!("   Year to date: {} crashes, {} fatalities, {} injuries",
                stats.ytd_crashes, stats.ytd_fatalities, stats.ytd_injuries);
            println!("   Text: {}", artifact.text);
            println!("   Artifact: {}", receipt.id);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Publisher credentials may come from a local .env
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    if let Err(e) = execute(cli).await {
        // A failed run publishes nothing; the scheduler sees the non-zero
        // exit and reports the job as failed.
        error!("Pipeline run failed: {}", e);
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
