//! Sheetstream - Streamed tabular export to S3-compatible object stores
//!
//! Demo entry point: generates synthetic rows, streams them to the
//! configured bucket as a multipart upload, then lists the bucket, checks
//! the object exists and prints a presigned download URL.

use clap::Parser;
use sheetstream::codec::{BatchEncoder, CsvEncoder, ExcelEncoder};
use sheetstream::config::{Config, ExportFormat};
use sheetstream::rows::SyntheticRows;
use sheetstream::store::S3Client;
use sheetstream::upload::MultipartExporter;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Sheetstream - streamed CSV/Excel export via S3 multipart upload
#[derive(Parser, Debug)]
#[command(name = "sheetstream")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
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
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Sheetstream v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load(&args.config)?;
    info!("Loaded configuration from {:?}", args.config);

    let client = S3Client::new(&config.store).await?;

    // Ctrl-C aborts the in-flight upload instead of leaving a dangling session
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling export");
                cancel.cancel();
            }
        });
    }

    let exporter = MultipartExporter::new(&client, &config.store.bucket, config.export.part_size);
    let mut source = SyntheticRows::new(config.export.row_limit);

    let encoder: &dyn BatchEncoder = match config.export.format {
        ExportFormat::Csv => &CsvEncoder,
        ExportFormat::Excel => &ExcelEncoder,
    };

    info!(
        key = %config.export.key,
        rows = config.export.row_limit,
        part_size = config.export.part_size,
        "uploading export in parts"
    );
    let summary = exporter
        .export(
            &config.export.key,
            encoder,
            &mut source,
            config.export.batch_rows,
            &cancel,
        )
        .await?;
    info!(
        etag = %summary.etag,
        parts = summary.parts,
        bytes = summary.bytes,
        "export uploaded"
    );

    info!("Listing objects...");
    for entry in client.list_objects().await? {
        info!(key = %entry.key, size = entry.size, "object");
    }

    info!("Checking if object exists...");
    let exists = client.object_exists(&config.export.key).await?;
    info!(exists, "existence check");

    if exists {
        let url = client
            .presigned_get_url(
                &config.export.key,
                Duration::from_secs(config.export.presign_expiry_secs),
            )
            .await?;
        info!(%url, "presigned download URL");
    } else {
        warn!("exported object not found");
    }

    Ok(())
}
