use thiserror::Error;

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors that can occur while managing topics, subscriptions or publishing
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Topic not found: {topic}")]
    TopicNotFound { topic: String },

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

impl NotifyError {
    /// Create a backend error from any provider error
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

    /// Backend error with a pre-rendered message
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

    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn topic_not_found<S: Into<String>>(topic: S) -> Self {
        Self::TopicNotFound { topic: topic.into() }
    }

    /// Name of the provider operation that failed, if any
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Backend { operation, .. } => Some(operation),
            _ => None,
        }
    }
}
