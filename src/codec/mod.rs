//! Batch encoding module
//!
//! Turns finite batches of rows into byte payloads. Encoders are stateless;
//! whether a header is written is decided by the caller so that successive
//! calls with `write_header = false` concatenate into one logical file.

use crate::rows::Record;
use thiserror::Error;

pub mod csv;
pub mod excel;

pub use self::csv::CsvEncoder;
pub use self::excel::ExcelEncoder;

/// Encoding errors
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Workbook encoding failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Serializes a batch of records into a byte payload.
///
/// Contract: the encoder itself carries no header state. If `write_header`
/// is true a header record precedes the data records; otherwise records are
/// simply appended. Same batch + same flag must produce byte-identical
/// output.
pub trait BatchEncoder: Send + Sync {
    /// MIME type of the produced payload
    fn content_type(&self) -> &'static str;

    /// Encode `batch` into bytes, optionally preceded by a header record
    fn encode(&self, batch: &[Record], write_header: bool) -> Result<Vec<u8>, EncodeError>;
}
