//! Upload module
//!
//! Buffers encoded row batches into fixed-size parts and drives the S3
//! multipart upload protocol with abort-on-failure cleanup.

use crate::codec::EncodeError;
use crate::store::StoreError;
use thiserror::Error;

pub mod buffer;
pub mod multipart;

pub use buffer::PartBuffer;
pub use multipart::{MultipartExporter, UploadSummary};

/// Minimum part size (5MB) - S3 requirement for all parts except the last
pub const MIN_PART_SIZE: usize = 5 * 1024 * 1024;

/// Maximum parts allowed per upload
pub const MAX_PARTS: i32 = 10000;

/// Upload errors.
///
/// When the main loop fails after a successful initiate, the session is
/// aborted best-effort and the original error is returned unchanged. Only
/// when the abort itself also fails is the original wrapped in
/// [`UploadError::AbortFailed`] so neither failure is swallowed.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("upload cancelled")]
    Cancelled,

    #[error("upload failed ({source}); abort also failed: {abort_error}")]
    AbortFailed {
        source: Box<UploadError>,
        abort_error: StoreError,
    },
}
