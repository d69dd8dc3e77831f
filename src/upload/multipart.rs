//! Multipart export coordinator
//!
//! Pulls row batches, encodes them, buffers the bytes into parts and drives
//! one multipart upload session from initiate to complete. Any failure after
//! a successful initiate triggers a best-effort abort so the store is never
//! left with a dangling session.

use super::{PartBuffer, UploadError, MAX_PARTS};
use crate::codec::BatchEncoder;
use crate::rows::RowSource;
use crate::store::{MultipartStore, PartReceipt, StoreError};
use tokio_util::sync::CancellationToken;

/// Session lifecycle: InProgress until exactly one of complete/abort lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    InProgress,
    Completed,
    Aborted,
}

/// One in-progress multipart upload session
#[derive(Debug)]
struct UploadSession {
    upload_id: String,
    parts: Vec<PartReceipt>,
    next_part_number: i32,
    state: SessionState,
}

impl UploadSession {
    fn new(upload_id: String) -> Self {
        Self {
            upload_id,
            parts: Vec::new(),
            next_part_number: 1,
            state: SessionState::InProgress,
        }
    }

    fn record(&mut self, receipt: PartReceipt) {
        debug_assert_eq!(receipt.part_number, self.next_part_number);
        self.parts.push(receipt);
        self.next_part_number += 1;
    }
}

/// Outcome of a finished export
#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub key: String,
    pub etag: String,
    pub parts: usize,
    pub bytes: u64,
}

/// Coordinates the row -> encode -> buffer -> upload-part pipeline for one
/// object at a time.
///
/// A single export is strictly sequential; run independent exporters for
/// concurrent uploads. All per-upload state (cursor, header flag, buffer,
/// session) lives inside one `export` call, so nothing is shared between
/// uploads.
pub struct MultipartExporter<S> {
    store: S,
    bucket: String,
    part_size: usize,
}

impl<S: MultipartStore> MultipartExporter<S> {
    /// Create an exporter targeting `bucket` with the given part size
    pub fn new(store: S, bucket: impl Into<String>, part_size: usize) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            part_size,
        }
    }

    /// Stream the whole row source to `key` as one multipart upload.
    ///
    /// The header is written exactly once, ahead of the first batch. Parts
    /// are numbered from 1 with no gaps. The cancellation token is checked
    /// between batches and before each network call; a cancelled export is
    /// aborted like any other failure.
    #[tracing::instrument(
        name = "export.multipart",
        skip(self, encoder, source, cancel),
        fields(s3.bucket = %self.bucket, s3.key = %key),
        err
    )]
    pub async fn export(
        &self,
        key: &str,
        encoder: &dyn BatchEncoder,
        source: &mut dyn RowSource,
        batch_rows: usize,
        cancel: &CancellationToken,
    ) -> Result<UploadSummary, UploadError> {
        let upload_id = self.store.initiate_multipart(&self.bucket, key).await?;
        tracing::info!(upload_id = %upload_id, "initiated multipart upload");

        let mut session = UploadSession::new(upload_id);
        match self
            .run(key, &mut session, encoder, source, batch_rows, cancel)
            .await
        {
            Ok(summary) => Ok(summary),
            Err(err) => {
                match self
                    .store
                    .abort_multipart(&self.bucket, key, &session.upload_id)
                    .await
                {
                    Ok(()) => {
                        session.state = SessionState::Aborted;
                        tracing::warn!(
                            upload_id = %session.upload_id,
                            state = ?session.state,
                            error = %err,
                            "multipart upload aborted"
                        );
                        Err(err)
                    }
                    Err(abort_error) => Err(UploadError::AbortFailed {
                        source: Box::new(err),
                        abort_error,
                    }),
                }
            }
        }
    }

    async fn run(
        &self,
        key: &str,
        session: &mut UploadSession,
        encoder: &dyn BatchEncoder,
        source: &mut dyn RowSource,
        batch_rows: usize,
        cancel: &CancellationToken,
    ) -> Result<UploadSummary, UploadError> {
        let batch_rows = batch_rows.max(1);
        let mut buffer = PartBuffer::new(self.part_size);
        let mut write_header = true;
        let mut total_bytes: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(UploadError::Cancelled);
            }

            let (batch, exhausted) = source.next_batch(batch_rows);

            // An empty source still yields a header-only object.
            if !batch.is_empty() || write_header {
                let encoded = encoder.encode(&batch, write_header)?;
                write_header = false;
                buffer.append(&encoded);
            }

            if buffer.is_full() || (exhausted && !buffer.is_empty()) {
                let flushed = self.flush_part(key, session, &mut buffer, cancel).await?;
                total_bytes += flushed as u64;
            }

            if exhausted {
                break;
            }
        }

        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        debug_assert_eq!(session.state, SessionState::InProgress);
        let etag = self
            .store
            .complete_multipart(&self.bucket, key, &session.upload_id, session.parts.clone())
            .await?;
        session.state = SessionState::Completed;

        tracing::info!(
            upload_id = %session.upload_id,
            parts = session.parts.len(),
            "multipart upload completed"
        );

        Ok(UploadSummary {
            key: key.to_string(),
            etag,
            parts: session.parts.len(),
            bytes: total_bytes,
        })
    }

    async fn flush_part(
        &self,
        key: &str,
        session: &mut UploadSession,
        buffer: &mut PartBuffer,
        cancel: &CancellationToken,
    ) -> Result<usize, UploadError> {
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        if session.next_part_number > MAX_PARTS {
            return Err(StoreError::Protocol(format!(
                "part count would exceed the {} part limit",
                MAX_PARTS
            ))
            .into());
        }

        let body = buffer.take();
        let size = body.len();
        let receipt = self
            .store
            .upload_part(
                &self.bucket,
                key,
                &session.upload_id,
                session.next_part_number,
                body,
            )
            .await?;

        tracing::info!(
            part_number = receipt.part_number,
            etag = %receipt.etag,
            bytes = size,
            "uploaded part"
        );
        session.record(receipt);
        Ok(size)
    }
}
