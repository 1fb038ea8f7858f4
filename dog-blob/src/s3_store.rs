use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream as AwsByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use crate::{BlobError, BlobResult, BlobStore, BucketPlacement, ListPage, PutResult, S3Config};

/// Production store implementation using the AWS SDK (AWS S3 or any S3-compatible server)
#[derive(Clone)]
pub struct S3CompatibleStore {
    client: Client,
    region: Option<String>,
}

impl S3CompatibleStore {
    /// Build a store from explicit settings
    pub async fn connect(config: S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = config.region.clone() {
            loader = loader.region(Region::new(region));
        }
        if let Some(creds) = &config.credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id.clone(),
                creds.secret_access_key.clone(),
                creds.session_token.clone(),
                None,
                "dog-blob",
            ));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let region = sdk_config.region().map(|r| r.as_ref().to_string());
        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::from(&sdk_config)
                .force_path_style(config.force_path_style)
                .build(),
        );

        Self { client, region }
    }

    /// Wrap a pre-configured client
    pub fn from_client(client: Client, region: Option<String>) -> Self {
        Self { client, region }
    }

    /// Region the client resolved to, if any
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Placement for buckets created through this store
    pub fn placement(&self) -> BucketPlacement {
        BucketPlacement::new(self.region.clone())
    }

    fn map_aws_error<E>(operation: &'static str, err: E) -> BlobError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = DisplayErrorContext(&err).to_string();
        BlobError::backend_with_message(operation, message, err)
    }

    /// `CopySource` is `bucket/key` with each key segment URL-encoded
    fn copy_source(bucket: &str, key: &str) -> String {
        let encoded = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", bucket, encoded)
    }
}

#[async_trait]
impl BlobStore for S3CompatibleStore {
    async fn bucket_exists(&self, bucket: &str) -> BlobResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                if err.as_service_error().is_some_and(HeadBucketError::is_not_found) {
                    Ok(false)
                } else {
                    Err(Self::map_aws_error("HeadBucket", err))
                }
            }
        }
    }

    async fn create_bucket(&self, bucket: &str, placement: &BucketPlacement) -> BlobResult<()> {
        let mut request = self.client.create_bucket().bucket(bucket);

        if let Some(constraint) = placement.location_constraint() {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(constraint))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|err| Self::map_aws_error("CreateBucket", err))?;
        debug!(bucket, constraint = ?placement.location_constraint(), "created bucket");
        Ok(())
    }

    async fn list_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation: Option<String>,
    ) -> BlobResult<ListPage> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation);

        if let Some(prefix) = prefix {
            request = request.prefix(prefix);
        }

        let output = request
            .send()
            .await
            .map_err(|err| Self::map_aws_error("ListObjectsV2", err))?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect::<Vec<_>>();

        let next_continuation = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        debug!(bucket, count = keys.len(), more = next_continuation.is_some(), "listed page");
        Ok(ListPage {
            keys,
            next_continuation,
        })
    }

    async fn exists(&self, bucket: &str, key: &str) -> BlobResult<bool> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                if err.as_service_error().is_some_and(HeadObjectError::is_not_found) {
                    Ok(false)
                } else {
                    Err(Self::map_aws_error("HeadObject", err))
                }
            }
        }
    }

    async fn get(&self, bucket: &str, key: &str) -> BlobResult<Option<Bytes>> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                if err.as_service_error().is_some_and(GetObjectError::is_no_such_key) {
                    return Ok(None);
                }
                return Err(Self::map_aws_error("GetObject", err));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|err| Self::map_aws_error("GetObject", err))?;
        Ok(Some(body.into_bytes()))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> BlobResult<PutResult> {
        let size_bytes = body.len() as u64;
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(AwsByteStream::from(body));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        let result = request
            .send()
            .await
            .map_err(|err| Self::map_aws_error("PutObject", err))?;

        Ok(PutResult {
            etag: result.e_tag,
            size_bytes,
        })
    }

    async fn copy(&self, bucket: &str, from_key: &str, to_key: &str) -> BlobResult<()> {
        self.client
            .copy_object()
            .bucket(bucket)
            .copy_source(Self::copy_source(bucket, from_key))
            .key(to_key)
            .send()
            .await
            .map_err(|err| Self::map_aws_error("CopyObject", err))?;
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> BlobResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| Self::map_aws_error("DeleteObject", err))?;
        Ok(())
    }
}
