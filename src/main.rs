use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use pricewatch::config::AppConfig;
use pricewatch::history::render_price_history;
use pricewatch::price_check::PriceChecker;
use pricewatch::price_log::PriceLog;
use pricewatch::report::{self, summary};

#[derive(Parser, Debug)]
#[command(name = "pricewatch", version, about = "Price checks and sales KPI reports")]
struct Cli {
    /// Extra configuration file layered over config/default and config/local
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the product page once, log the price and alert if below target
    Check {
        #[arg(long)]
        url: Option<String>,
    },
    /// Summarise a sales CSV and render the report charts
    Report {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Print the full report as JSON instead of the KPI summary
        #[arg(long)]
        json: bool,
    },
    /// Plot the logged prices over time
    History {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { "pricewatch=debug" } else { "pricewatch=info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Check { url } => {
            let url = url.unwrap_or_else(|| config.tracker.url.clone());
            let checker = PriceChecker::from_config(&config)?;
            let today = chrono::Local::now().date_naive();
            let result = checker.check(&url, today).await.context("price check failed")?;
            info!(
                log = %config.tracker.log_path.display(),
                notification = ?result.notification,
                "done"
            );
        }
        Command::Report {
            input,
            output_dir,
            json,
        } => {
            let mut report_config = config.report.clone();
            if let Some(input) = input {
                report_config.input_path = input;
            }
            if let Some(output_dir) = output_dir {
                report_config.output_dir = output_dir;
            }

            let sales_report = report::build_report(&report_config)
                .with_context(|| format!("building report from {}", report_config.input_path.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&sales_report)?);
            } else {
                println!("{}", summary::format_kpis(&sales_report.kpis));
            }

            report::render_charts(&sales_report, &report_config.output_dir)?;
        }
        Command::History { output } => {
            let output = output.unwrap_or_else(|| config.tracker.history_chart.clone());
            let log = PriceLog::new(&config.tracker.log_path);
            render_price_history(&log, &output)?;
        }
    }

    Ok(())
}
