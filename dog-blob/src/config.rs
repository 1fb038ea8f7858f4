use std::env;

use crate::{BlobError, BlobResult};

/// Region whose buckets must be created without a location constraint
pub const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for an S3-compatible store
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    /// Region override; the AWS default chain is used when `None`
    pub region: Option<String>,

    /// Custom endpoint (MinIO, RustFS, LocalStack, ...)
    pub endpoint_url: Option<String>,

    /// Static credentials; the AWS default chain is used when `None`
    pub credentials: Option<StaticCredentials>,

    /// Path-style addressing, required by most S3-compatible servers
    pub force_path_style: bool,
}

/// Access key pair for stores that don't sit behind the AWS credential chain
#[derive(Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl S3Config {
    /// Create a config that defers everything to the AWS default chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the optional S3 overrides from the environment.
    ///
    /// `S3_ENDPOINT_URL` switches on path-style addressing. Credentials are only
    /// taken from `S3_ACCESS_KEY_ID`/`S3_SECRET_ACCESS_KEY` when both are set.
    pub fn from_env() -> BlobResult<Self> {
        fn opt_env(key: &str) -> Option<String> {
            env::var(key).ok().filter(|v| !v.trim().is_empty())
        }

        let credentials = match (opt_env("S3_ACCESS_KEY_ID"), opt_env("S3_SECRET_ACCESS_KEY")) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
                session_token: opt_env("S3_SESSION_TOKEN"),
            }),
            (None, None) => None,
            _ => {
                return Err(BlobError::invalid(
                    "S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY must be set together",
                ))
            }
        };

        let endpoint_url = opt_env("S3_ENDPOINT_URL");
        Ok(Self {
            region: opt_env("AWS_REGION").or_else(|| opt_env("AWS_DEFAULT_REGION")),
            force_path_style: endpoint_url.is_some(),
            endpoint_url,
            credentials,
        })
    }

    /// Set the region
    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Point the client at a custom endpoint (enables path-style addressing)
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint_url: S) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self.force_path_style = true;
        self
    }

    /// Use static credentials
    pub fn with_credentials<A: Into<String>, S: Into<String>>(mut self, access_key_id: A, secret_access_key: S) -> Self {
        self.credentials = Some(StaticCredentials {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        });
        self
    }
}

/// Where a new bucket gets created.
///
/// S3 rejects an explicit `us-east-1` location constraint, so that region
/// (and an unknown region) creates without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPlacement {
    region: Option<String>,
}

impl BucketPlacement {
    pub fn new(region: Option<String>) -> Self {
        Self { region }
    }

    pub fn in_region<S: Into<String>>(region: S) -> Self {
        Self {
            region: Some(region.into()),
        }
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Location constraint to send with `CreateBucket`, if any
    pub fn location_constraint(&self) -> Option<&str> {
        match self.region.as_deref() {
            None | Some(DEFAULT_REGION) => None,
            Some(region) => Some(region),
        }
    }
}
