mod progress;
mod scrape;
mod verify;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use gmscrape_core::ScrapeConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gmscrape")]
#[command(about = "Scrape business listings from a maps search into JSON, CSV and text reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one search and write its session output.
    Scrape(ScrapeArgs),
    /// Run every search of a YAML file, one after another.
    Batch {
        #[arg(long)]
        file: PathBuf,
        /// Headless default for entries that do not set one.
        #[arg(long)]
        headless: bool,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print the session directory name for a query and location.
    DirName {
        #[arg(long, short)]
        query: String,
        #[arg(long, short)]
        location: String,
    },
    /// List session output found under the output directory.
    Verify {
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct ScrapeArgs {
    #[arg(long, short)]
    query: String,
    #[arg(long, short)]
    location: String,
    #[arg(long, default_value_t = ScrapeConfig::DEFAULT_MAX_RESULTS)]
    max_results: usize,
    /// Seconds to wait after opening each listing.
    #[arg(long, default_value_t = ScrapeConfig::DEFAULT_PER_ITEM_WAIT_SECS)]
    wait_secs: u64,
    #[arg(long)]
    headless: bool,
    #[command(flatten)]
    target: TargetArgs,
}

/// Overrides for where output goes and which WebDriver to drive.
#[derive(Debug, Args, Default)]
struct TargetArgs {
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[arg(long)]
    webdriver_url: Option<String>,
}

impl ScrapeArgs {
    fn to_scrape_config(&self) -> anyhow::Result<ScrapeConfig> {
        Ok(ScrapeConfig::new(&self.query, &self.location)?
            .with_max_results(self.max_results)?
            .with_per_item_wait_secs(self.wait_secs)
            .with_headless(self.headless))
    }
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = gmscrape_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    match cli.command {
        Commands::Scrape(args) => {
            let scrape_config = args.to_scrape_config()?;
            let target = scrape::Target::resolve(&config, &args.target);
            let report = scrape::run_scrape(&config, &target, scrape_config).await?;
            Ok(scrape::exit_code(&[report.state]))
        }
        Commands::Batch {
            file,
            headless,
            target,
        } => {
            let target = scrape::Target::resolve(&config, &target);
            let states = scrape::run_batch(&config, &target, &file, headless).await?;
            Ok(scrape::exit_code(&states))
        }
        Commands::DirName { query, location } => {
            let scrape_config = ScrapeConfig::new(&query, &location)?;
            println!(
                "{}",
                gmscrape_export::session_dir_name(scrape_config.query(), scrape_config.location())
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify { output_dir } => {
            let root = output_dir.unwrap_or_else(|| config.output_dir.clone());
            verify::run_verify(&root)
        }
    }
}
