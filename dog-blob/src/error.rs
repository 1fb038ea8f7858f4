use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur during blob operations
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob not found: {key}")]
    NotFound { key: String },

    #[error("Bucket not found: {bucket}")]
    BucketNotFound { bucket: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl BlobError {
    /// Create a backend error from any provider error, keeping its rendered detail
    pub fn backend<E>(operation: &'static str, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            operation,
            message: error.to_string(),
            source: Box::new(error),
        }
    }

    /// Same as [`BlobError::backend`] but with an already rendered message.
    ///
    /// The AWS SDK's `Display` for `SdkError` is a one-word summary, so the
    /// S3 store renders the full context itself and passes it in here.
    pub fn backend_with_message<E, S>(operation: &'static str, message: S, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        S: Into<String>,
    {
        Self::Backend {
            operation,
            message: message.into(),
            source: Box::new(error),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a bucket not found error
    pub fn bucket_not_found<S: Into<String>>(bucket: S) -> Self {
        Self::BucketNotFound {
            bucket: bucket.into(),
        }
    }

    /// Name of the store operation that failed, when the provider reported it
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Backend { operation, .. } => Some(operation),
            _ => None,
        }
    }
}
