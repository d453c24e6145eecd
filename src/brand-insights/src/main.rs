//! Brand Insights — aggregate campaign metric CSV exports into one row per
//! campaign/keyword/brand group with CTR, A2C rate, cost and ROI.

use campaign_core::config::{AppConfig, ExportFormat};
use campaign_core::CampaignError;
use campaign_reporting::report::{CSV_CONTENT_TYPE, JSON_CONTENT_TYPE};
use campaign_reporting::{read_rows, InsightsReport};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "brand-insights")]
#[command(about = "Aggregate campaign metric CSV files into brand insights")]
#[command(version)]
struct Cli {
    /// Input CSV file (first line is the header)
    input: PathBuf,

    /// Output directory (overrides config)
    #[arg(long, env = "BRAND_INSIGHTS__EXPORT__OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Output file name (overrides config)
    #[arg(long, env = "BRAND_INSIGHTS__EXPORT__FILE_NAME")]
    file_name: Option<String>,

    /// Export format: csv or json (overrides config)
    #[arg(long, env = "BRAND_INSIGHTS__EXPORT__FORMAT")]
    format: Option<ExportFormat>,

    /// Write the table to stdout instead of a file
    #[arg(long, default_value_t = false)]
    stdout: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "brand_insights=info,campaign_reporting=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load();
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    };
    init_tracing(config.logging.json);
    if let Err(e) = loaded {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    // Apply CLI overrides
    if let Some(dir) = cli.output_dir {
        config.export.output_dir = dir;
    }
    if let Some(name) = cli.file_name {
        config.export.file_name = name;
    }
    if let Some(format) = cli.format {
        config.export.format = format;
    }

    info!(
        input = %cli.input.display(),
        format = config.export.format.extension(),
        "Brand insights starting"
    );

    let raw = tokio::fs::read(&cli.input).await?;
    let rows = match read_rows(raw.as_slice()) {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "Input could not be decoded");
            return Err(e.into());
        }
    };

    // Aggregation is synchronous; keep it off the async workers.
    let report = tokio::task::spawn_blocking(move || InsightsReport::build(&rows))
        .await
        .map_err(|e| {
            error!(error = %e, "Aggregation task failed");
            CampaignError::Processing(e.to_string())
        })?;

    let body = report.export(config.export.format)?;
    let content_type = match config.export.format {
        ExportFormat::Csv => CSV_CONTENT_TYPE,
        ExportFormat::Json => JSON_CONTENT_TYPE,
    };

    if cli.stdout {
        print!("{body}");
    } else {
        let path = config.export.output_path();
        tokio::fs::write(&path, body.as_bytes()).await?;
        info!(
            path = %path.display(),
            content_type,
            groups = report.summary.groups,
            "Aggregated table written"
        );
    }

    Ok(())
}
