//! Matchup derivation runner.
//!
//! Reads the matched track arrays of one orbit crossing from JSON, runs the
//! derivation pipeline and writes the derived records as JSON.

mod run;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "matchup-runner")]
#[command(about = "Derive CALIOP/CloudSat/AVHRR matchup records")]
struct Args {
    /// Configuration file path (YAML). Defaults apply when omitted.
    #[arg(short, long, env = "ATRAIN_CONFIG")]
    config: Option<String>,

    /// Matched track arrays (JSON)
    #[arg(short, long)]
    input: String,

    /// Output file for derived records (default: stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Override the process mode (BASIC or EMISSFILT)
    #[arg(long)]
    process_mode: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so records can be piped from stdout
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting matchup runner");

    let config = run::load_config(args.config.as_deref(), args.process_mode.as_deref())?;
    info!(
        resolution_km = config.resolution_km,
        platform = %config.platform,
        process_mode = %config.process_mode,
        "Loaded configuration"
    );

    let records = run::run(config, &args.input)?;
    let json = serde_json::to_string_pretty(&records)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!(path = %path, footprints = records.footprints, "Wrote derived records");
        }
        None => println!("{}", json),
    }

    Ok(())
}
