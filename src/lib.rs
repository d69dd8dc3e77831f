//! Sheetstream Library
//!
//! Streams large generated tabular files (CSV/Excel) to S3-compatible object
//! stores using multipart upload, buffering serialized rows into fixed-size
//! parts so the whole file never has to sit in memory.
//!
//! # Pipeline
//!
//! ```text
//! RowSource -> BatchEncoder -> PartBuffer -> MultipartExporter -> S3Client
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sheetstream::codec::CsvEncoder;
//! use sheetstream::config::Config;
//! use sheetstream::rows::SyntheticRows;
//! use sheetstream::store::S3Client;
//! use sheetstream::upload::MultipartExporter;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let client = S3Client::new(&config.store).await?;
//!     let exporter = MultipartExporter::new(
//!         &client,
//!         &config.store.bucket,
//!         config.export.part_size,
//!     );
//!
//!     let mut source = SyntheticRows::new(config.export.row_limit);
//!     let summary = exporter
//!         .export(
//!             &config.export.key,
//!             &CsvEncoder,
//!             &mut source,
//!             config.export.batch_rows,
//!             &CancellationToken::new(),
//!         )
//!         .await?;
//!     println!("uploaded {} parts ({} bytes)", summary.parts, summary.bytes);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod rows;
pub mod store;
pub mod upload;

// Re-export commonly used types
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
