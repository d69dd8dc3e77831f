//! Object store client module
//!
//! Wraps the AWS SDK S3 client behind the small set of operations the export
//! pipeline needs. The multipart protocol surface (initiate / upload part /
//! complete / abort) is expressed as the [`MultipartStore`] trait so the
//! coordinator never depends on the SDK directly.
//!
//! # Error taxonomy
//!
//! SDK failures are folded into four kinds: transport problems become
//! [`StoreError::Connectivity`], credential rejections become
//! [`StoreError::Authorization`], missing objects become
//! [`StoreError::NotFound`], and everything else the service rejects is a
//! [`StoreError::Protocol`] violation.

use crate::config::StoreConfig;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Object store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Classify an SDK failure into a [`StoreError`] kind.
fn classify<E>(err: SdkError<E>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let detail = format!("{}", DisplayErrorContext(&err));
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StoreError::Connectivity(detail)
        }
        SdkError::ServiceError(ctx) => {
            let status = ctx.raw().status().as_u16();
            match (err.code(), status) {
                (
                    Some("AccessDenied")
                    | Some("InvalidAccessKeyId")
                    | Some("SignatureDoesNotMatch")
                    | Some("ExpiredToken"),
                    _,
                )
                | (_, 401 | 403) => StoreError::Authorization(detail),
                (Some("NoSuchKey") | Some("NoSuchBucket") | Some("NotFound"), _) | (_, 404) => {
                    StoreError::NotFound(detail)
                }
                _ => StoreError::Protocol(detail),
            }
        }
        _ => StoreError::Connectivity(detail),
    }
}

/// Receipt for one uploaded part: the part number it was sent as plus the
/// ETag the store returned. Completion requires the full ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartReceipt {
    pub part_number: i32,
    pub etag: String,
}

/// One entry from a bucket listing
#[derive(Debug, Clone)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
}

/// The multipart upload protocol surface consumed by the coordinator.
///
/// Part numbers must be in 1..=10000 and submitted in strictly increasing
/// order; every part except the last must meet the store's 5 MiB minimum.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MultipartStore: Send + Sync {
    /// Start a multipart upload session, returning its upload id
    async fn initiate_multipart(&self, bucket: &str, key: &str) -> Result<String, StoreError>;

    /// Upload one part of an open session
    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> Result<PartReceipt, StoreError>;

    /// Finalize the session from the ordered part receipts, returning the
    /// assembled object's ETag
    async fn complete_multipart(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<PartReceipt>,
    ) -> Result<String, StoreError>;

    /// Abandon the session and discard its uploaded parts
    async fn abort_multipart(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: MultipartStore + ?Sized> MultipartStore for &T {
    async fn initiate_multipart(&self, bucket: &str, key: &str) -> Result<String, StoreError> {
        (**self).initiate_multipart(bucket, key).await
    }

    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> Result<PartReceipt, StoreError> {
        (**self)
            .upload_part(bucket, key, upload_id, part_number, body)
            .await
    }

    async fn complete_multipart(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<PartReceipt>,
    ) -> Result<String, StoreError> {
        (**self)
            .complete_multipart(bucket, key, upload_id, parts)
            .await
    }

    async fn abort_multipart(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<(), StoreError> {
        (**self).abort_multipart(bucket, key, upload_id).await
    }
}

/// S3 client wrapper bound to one bucket.
pub struct S3Client {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
}

impl S3Client {
    /// Build a client from store configuration.
    ///
    /// Static credentials from the config take precedence over the default
    /// AWS provider chain. A custom endpoint switches the client to
    /// path-style addressing (LocalStack/MinIO).
    pub async fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let base = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&base);

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            builder = builder.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "sheetstream-config",
            ));
        }

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
        })
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Get the region
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Upload a whole object in one request (PutObject)
    #[tracing::instrument(
        name = "s3.put_object",
        skip(self, body),
        fields(
            s3.bucket = %self.bucket,
            s3.key = %key,
            upload.bytes = body.len()
        ),
        err
    )]
    pub async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<String, StoreError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body));
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        let response = request.send().await.map_err(classify)?;
        let etag = response.e_tag().unwrap_or_default().to_string();

        tracing::info!(etag = %etag, "PutObject completed");
        Ok(etag)
    }

    /// Download an object's full body
    #[tracing::instrument(
        name = "s3.get_object",
        skip(self),
        fields(s3.bucket = %self.bucket, s3.key = %key),
        err
    )]
    pub async fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(classify)?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Connectivity(e.to_string()))?;
        Ok(data.into_bytes().to_vec())
    }

    /// Delete an object
    #[tracing::instrument(
        name = "s3.delete_object",
        skip(self),
        fields(s3.bucket = %self.bucket, s3.key = %key),
        err
    )]
    pub async fn delete_object(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    /// List objects in the bucket (first page)
    #[tracing::instrument(
        name = "s3.list_objects",
        skip(self),
        fields(s3.bucket = %self.bucket),
        err
    )]
    pub async fn list_objects(&self) -> Result<Vec<ObjectSummary>, StoreError> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(classify)?;

        Ok(response
            .contents()
            .iter()
            .map(|object| ObjectSummary {
                key: object.key().unwrap_or_default().to_string(),
                size: object.size().unwrap_or_default(),
            })
            .collect())
    }

    /// Check whether an object exists.
    ///
    /// A "not found" response is a `false` answer, not an error; any other
    /// failure propagates unchanged.
    #[tracing::instrument(
        name = "s3.head_object",
        skip(self),
        fields(s3.bucket = %self.bucket, s3.key = %key),
        err
    )]
    pub async fn object_exists(&self, key: &str) -> Result<bool, StoreError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                if let Some(service_err) = err.as_service_error() {
                    if service_err.is_not_found() {
                        return Ok(false);
                    }
                }
                match classify(err) {
                    StoreError::NotFound(_) => Ok(false),
                    other => Err(other),
                }
            }
        }
    }

    /// Generate a time-limited retrieval URL for an object
    #[tracing::instrument(
        name = "s3.presign_get_object",
        skip(self),
        fields(s3.bucket = %self.bucket, s3.key = %key, expiry_secs = expiry.as_secs()),
        err
    )]
    pub async fn presigned_get_url(
        &self,
        key: &str,
        expiry: Duration,
    ) -> Result<String, StoreError> {
        let presign_config =
            PresigningConfig::expires_in(expiry).map_err(|e| StoreError::Protocol(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(classify)?;

        Ok(request.uri().to_string())
    }
}

#[async_trait]
impl MultipartStore for S3Client {
    #[tracing::instrument(
        name = "s3.create_multipart_upload",
        skip(self),
        fields(s3.bucket = %bucket, s3.key = %key),
        err
    )]
    async fn initiate_multipart(&self, bucket: &str, key: &str) -> Result<String, StoreError> {
        let response = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(classify)?;

        let upload_id = response
            .upload_id()
            .map(str::to_owned)
            .ok_or_else(|| StoreError::Protocol("no upload id in response".into()))?;

        tracing::info!(upload_id = %upload_id, "CreateMultipartUpload completed");
        Ok(upload_id)
    }

    #[tracing::instrument(
        name = "s3.upload_part",
        skip(self, body),
        fields(
            s3.bucket = %bucket,
            s3.key = %key,
            s3.upload_id = %upload_id,
            s3.part_number = part_number,
            upload.bytes = body.len()
        ),
        err
    )]
    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> Result<PartReceipt, StoreError> {
        let size = body.len();
        let response = self
            .client
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(classify)?;

        let etag = response
            .e_tag()
            .map(str::to_owned)
            .ok_or_else(|| StoreError::Protocol("no etag in upload part response".into()))?;

        tracing::info!(etag = %etag, part_number, bytes = size, "UploadPart completed");
        Ok(PartReceipt { part_number, etag })
    }

    #[tracing::instrument(
        name = "s3.complete_multipart_upload",
        skip(self, parts),
        fields(
            s3.bucket = %bucket,
            s3.key = %key,
            s3.upload_id = %upload_id,
            parts_count = parts.len()
        ),
        err
    )]
    async fn complete_multipart(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<PartReceipt>,
    ) -> Result<String, StoreError> {
        let completed_parts: Vec<CompletedPart> = parts
            .iter()
            .map(|part| {
                CompletedPart::builder()
                    .part_number(part.part_number)
                    .e_tag(&part.etag)
                    .build()
            })
            .collect();

        let response = self
            .client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed_parts))
                    .build(),
            )
            .send()
            .await
            .map_err(classify)?;

        let etag = response.e_tag().unwrap_or_default().to_string();
        tracing::info!(etag = %etag, parts = parts.len(), "CompleteMultipartUpload completed");
        Ok(etag)
    }

    #[tracing::instrument(
        name = "s3.abort_multipart_upload",
        skip(self),
        fields(s3.bucket = %bucket, s3.key = %key, s3.upload_id = %upload_id),
        err
    )]
    async fn abort_multipart(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<(), StoreError> {
        self.client
            .abort_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(classify)?;

        tracing::info!("AbortMultipartUpload completed");
        Ok(())
    }
}
