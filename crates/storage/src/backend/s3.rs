//! S3 storage backend.
//!
//! Credentials come from the standard AWS provider chain; an optional
//! profile name and region override are passed through to the shared
//! config loader, matching what `aws --profile ... --region ...` would
//! resolve.

use crate::backend::ObjectReader;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::Region,
    error::{DisplayErrorContext, SdkError},
};
use exn::OptionExt;

use crate::StorageBackend;

/// Storage backend for AWS S3.
///
/// # Examples
///
/// ```no_run
/// use skiff_storage::backend::S3Backend;
///
/// # async fn example() {
/// let backend = S3Backend::connect("s3", Some("lab"), Some("us-east-1")).await;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct S3Backend {
    name: String,
    client: Client,
}

impl S3Backend {
    /// Create an S3 backend from the shared AWS configuration.
    ///
    /// # Arguments
    /// * `name` - A name for this backend (used in display/logging)
    /// * `profile` - Optional AWS profile name
    /// * `region` - Optional region override
    pub async fn connect(name: impl Into<String>, profile: Option<&str>, region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_owned()));
        }
        let config = loader.load().await;
        Self {
            name: name.into(),
            client: Client::new(&config),
        }
    }
}

/// Split connectivity failures from everything else the SDK reports.
fn classify<E, R>(error: SdkError<E, R>) -> ErrorKind
where
    SdkError<E, R>: std::error::Error,
{
    let message = DisplayErrorContext(&error).to_string();
    match error {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => ErrorKind::Network(message),
        _ => ErrorKind::Backend(message),
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stat(&self, bucket: &str, key: &str) -> Result<u64> {
        let head = match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(head) => head,
            Err(error) if error.as_service_error().is_some_and(|service| service.is_not_found()) => {
                exn::bail!(ErrorKind::NotFound {
                    bucket: bucket.to_owned(),
                    key: key.to_owned(),
                });
            },
            Err(error) => exn::bail!(classify(error)),
        };
        tracing::debug!(backend = self.name(), bucket, key, size = head.content_length(), "HeadObject ok");
        head.content_length()
            .filter(|size| *size >= 0)
            .map(|size| size as u64)
            .ok_or_raise(|| ErrorKind::MissingContentLength {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            })
    }

    async fn byte_stream(&self, bucket: &str, key: &str) -> Result<ObjectReader> {
        let object = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(object) => object,
            Err(error) if error.as_service_error().is_some_and(|service| service.is_no_such_key()) => {
                exn::bail!(ErrorKind::NotFound {
                    bucket: bucket.to_owned(),
                    key: key.to_owned(),
                });
            },
            Err(error) => exn::bail!(classify(error)),
        };
        tracing::debug!(backend = self.name(), bucket, key, "GetObject stream opened");
        Ok(Box::new(object.body.into_async_read()))
    }
}
