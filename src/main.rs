use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};

use scheinfirmen_at::config::Config;
use scheinfirmen_at::convert::csv::write_csv;
use scheinfirmen_at::convert::jsonl::write_jsonl;
use scheinfirmen_at::convert::xml::write_xml;
use scheinfirmen_at::download::download_extract;
use scheinfirmen_at::logging;
use scheinfirmen_at::parse::parse_bmf_extract;
use scheinfirmen_at::schema::write_schema_docs;
use scheinfirmen_at::stats::generate_stats;
use scheinfirmen_at::validate::validate_records;
use scheinfirmen_at::verify::verify_outputs;

#[derive(Parser)]
#[command(name = "scheinfirmen-at")]
#[command(about = "Scheinfirmen Österreich: download and convert the Austrian BMF shell company list")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose (DEBUG) logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire the extract, then parse, validate, convert and verify
    Run {
        /// Output directory for artifacts and schema documents
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// URL to download the extract from
        #[arg(long)]
        url: Option<String>,

        /// Use a local file instead of downloading
        #[arg(long)]
        input: Option<PathBuf>,

        /// Minimum expected record count
        #[arg(long)]
        min_rows: Option<usize>,

        /// Skip cross-format verification
        #[arg(long)]
        skip_verify: bool,

        /// Write a Markdown statistics report to this path
        #[arg(long)]
        stats: Option<PathBuf>,
    },
    /// Generate the statistics report from an existing JSONL artifact
    Stats {
        /// JSONL artifact to read (default: <output_dir>/scheinfirmen.jsonl)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Where to write the report
        #[arg(long, default_value = "data/STATS.md")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Run {
            output_dir,
            url,
            input,
            min_rows,
            skip_verify,
            stats,
        } => {
            let mut config = config;
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(url) = url {
                config.source_url = url;
            }
            if let Some(n) = min_rows {
                config.min_rows = n;
            }
            run(&config, input.as_deref(), skip_verify, stats.as_deref()).await
        }
        Commands::Stats { input, output } => {
            let jsonl_path = input.unwrap_or_else(|| config.output_dir.join("scheinfirmen.jsonl"));
            generate_stats(&jsonl_path, &output)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(
    config: &Config,
    input: Option<&std::path::Path>,
    skip_verify: bool,
    stats: Option<&std::path::Path>,
) -> anyhow::Result<ExitCode> {
    let kennziffer_re = config.kennziffer_regex()?;

    // Step 1: acquire the raw extract
    let raw_data = match input {
        Some(path) => {
            info!(file = %path.display(), "reading local extract");
            std::fs::read(path)?
        }
        None => {
            info!(url = %config.source_url, "downloading extract");
            download_extract(&config.source_url, &config.download).await?
        }
    };
    debug!(bytes = raw_data.len(), "acquired raw extract");

    // Step 2: parse
    let result = match parse_bmf_extract(&raw_data) {
        Ok(result) => result,
        Err(e) => {
            error!("Parse error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    info!(
        records = result.raw_row_count,
        stand = %result.stand(),
        "parsed extract"
    );

    // Step 3: validate
    let validation = validate_records(&result, config.min_rows, &kennziffer_re);
    for w in &validation.warnings {
        warn!("WARN: {}", w);
    }
    if !validation.ok() {
        for e in &validation.errors {
            error!("ERROR: {}", e);
        }
        error!(count = validation.errors.len(), "validation failed, aborting");
        return Ok(ExitCode::FAILURE);
    }
    info!(warnings = validation.warnings.len(), "validation passed");

    // Step 4: write artifacts and schema documents
    let out = &config.output_dir;
    let csv_path = out.join("scheinfirmen.csv");
    let jsonl_path = out.join("scheinfirmen.jsonl");
    let xml_path = out.join("scheinfirmen.xml");

    info!(dir = %out.display(), "writing artifacts");
    let n_csv = write_csv(&result, &csv_path)?;
    debug!(rows = n_csv, path = %csv_path.display(), "CSV written");
    let n_jsonl = write_jsonl(&result, &jsonl_path, &config.source_url)?;
    debug!(rows = n_jsonl, path = %jsonl_path.display(), "JSONL written");
    let n_xml = write_xml(&result, &xml_path, &config.source_url)?;
    debug!(rows = n_xml, path = %xml_path.display(), "XML written");
    write_schema_docs(out)?;

    // Step 5: cross-format verification
    if skip_verify {
        info!("verification skipped");
    } else {
        info!("verifying output consistency");
        let errors = verify_outputs(&csv_path, &jsonl_path, &xml_path, result.raw_row_count, true)?;
        if !errors.is_empty() {
            for e in &errors {
                error!("VERIFY ERROR: {}", e);
            }
            error!("cross-format verification failed, outputs may be inconsistent");
            return Ok(ExitCode::FAILURE);
        }
        info!(records = result.raw_row_count, "verification passed");
    }

    // Step 6: optional stats report, never fatal
    if let Some(stats_path) = stats {
        if let Err(e) = generate_stats(&jsonl_path, stats_path) {
            warn!("stats generation failed (non-fatal): {}", e);
        }
    }

    println!(
        "OK: wrote {} records to {}/ (Stand: {} {})",
        result.raw_row_count,
        out.display(),
        result.stand_datum,
        result.stand_zeit
    );
    Ok(ExitCode::SUCCESS)
}
