use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use sheet_sitemap::app::ports::LivenessCheck;
use sheet_sitemap::config::Config;
use sheet_sitemap::constants::ENV_CREDENTIALS;
use sheet_sitemap::credentials::encode_credentials;
use sheet_sitemap::infra::http_client::HttpLivenessChecker;
use sheet_sitemap::infra::source_factory::build_row_source;
use sheet_sitemap::infra::static_liveness::StaticLiveness;
use sheet_sitemap::pipeline::Pipeline;
use sheet_sitemap::metrics::init_metrics;
use sheet_sitemap::{logging, server};

#[derive(Parser)]
#[command(name = "sheet_sitemap")]
#[command(about = "Build sitemap.xml from the published rows of an editorial spreadsheet")]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to ./sitemap.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the sitemap once and write it to a file
    Generate {
        /// Output file (overrides output.path)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Read rows from a JSON export instead of the spreadsheet
        #[arg(long)]
        rows: Option<PathBuf>,
        /// Skip the URL liveness checks
        #[arg(long)]
        no_check: bool,
        /// Print the sitemap to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Serve GET /sitemap.xml, regenerated on every request
    Serve {
        /// Listening port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
        /// Read rows from a JSON export instead of the spreadsheet
        #[arg(long)]
        rows: Option<PathBuf>,
        /// Skip the URL liveness checks
        #[arg(long)]
        no_check: bool,
    },
    /// Print the base64 form of a service-account key file, ready for GOOGLE_CREDENTIALS_JSON
    EncodeCredentials {
        key_file: PathBuf,
        /// Write the blob to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn build_pipeline(config: &Config, rows: Option<PathBuf>, no_check: bool) -> anyhow::Result<Pipeline> {
    let blob = std::env::var(ENV_CREDENTIALS).ok();
    let source = build_row_source(config, rows, blob.as_deref())?;
    let check_liveness = config.liveness.enabled && !no_check;
    let liveness: Arc<dyn LivenessCheck> = if check_liveness {
        Arc::new(HttpLivenessChecker::new(Duration::from_secs(config.liveness.timeout_secs))?)
    } else {
        Arc::new(StaticLiveness::AllLive)
    };
    info!(source = %source.describe(), check_liveness, "Pipeline configured");
    Ok(Pipeline::new(source, config.filter.clone(), liveness, check_liveness))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Generate {
            output,
            rows,
            no_check,
            stdout,
        } => {
            let pipeline = build_pipeline(&config, rows, no_check)?;
            if stdout {
                let feed = pipeline.run().await?;
                use std::io::Write;
                std::io::stdout().write_all(&feed.xml)?;
            } else {
                let path = output.unwrap_or_else(|| config.output.path.clone());
                let feed = pipeline.write_to(&path).await?;
                println!("✅ {} URLs written to {}", feed.report.accepted, path.display());
            }
        }
        Commands::Serve { port, rows, no_check } => {
            init_metrics();
            let pipeline = build_pipeline(&config, rows, no_check)?;
            server::start_server(Arc::new(pipeline), port.unwrap_or(config.server.port)).await?;
        }
        Commands::EncodeCredentials { key_file, output } => {
            let bytes = std::fs::read(&key_file)
                .with_context(|| format!("reading key file {}", key_file.display()))?;
            let blob = encode_credentials(&bytes)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &blob)?;
                    println!("✅ Base64 credentials written to {}", path.display());
                }
                None => println!("{blob}"),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}
