use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::{SyncError, SyncResult, UploadPlacement};

/// Defaults used when the environment leaves a setting out
struct SyncDefaults;

impl SyncDefaults {
    const BUCKET: &'static str = "dct-sales-mohamed-kittany";
    const LOCAL_DIR: &'static str = "./dct-sales-local";
    const PREFIX: &'static str = "dct-sales/";
    const EXTENSION: &'static str = "csv";
    const LOCAL_LOG_FILE: &'static str = "local_application_logs.log";
    const LOG_FILE_NAME: &'static str = "application_logs.log";
    const TOPIC_NAME: &'static str = "EmailSalesRepFromS3Bucket";
}

/// Runtime settings for one sales-sync deployment
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub bucket: String,
    pub local_dir: PathBuf,
    /// Always ends with `/`
    pub destination_prefix: String,
    pub extension: String,
    pub local_log_file: PathBuf,
    pub log_key: String,
    pub topic_name: String,
    pub email: String,
    pub placement: UploadPlacement,
    /// Re-run period; `None` runs once
    pub interval: Option<Duration>,
    pub s3_endpoint: Option<String>,
}

impl SyncConfig {
    /// Defaults for everything except the recipient
    pub fn new<S: Into<String>>(email: S) -> Self {
        let destination_prefix = SyncDefaults::PREFIX.to_string();
        Self {
            bucket: SyncDefaults::BUCKET.to_string(),
            local_dir: PathBuf::from(SyncDefaults::LOCAL_DIR),
            log_key: format!("{}{}", destination_prefix, SyncDefaults::LOG_FILE_NAME),
            destination_prefix,
            extension: SyncDefaults::EXTENSION.to_string(),
            local_log_file: PathBuf::from(SyncDefaults::LOCAL_LOG_FILE),
            topic_name: SyncDefaults::TOPIC_NAME.to_string(),
            email: email.into(),
            placement: UploadPlacement::default(),
            interval: None,
            s3_endpoint: None,
        }
    }

    /// Load from `SALES_SYNC_*` environment variables
    pub fn from_env() -> SyncResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load through an arbitrary key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let email = get("SALES_SYNC_EMAIL")
            .ok_or_else(|| SyncError::config("SALES_SYNC_EMAIL is required"))?;
        let mut config = Self::new(email);

        if let Some(bucket) = get("SALES_SYNC_BUCKET") {
            config.bucket = bucket;
        }
        if let Some(dir) = get("SALES_SYNC_LOCAL_DIR") {
            config.local_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = get("SALES_SYNC_PREFIX") {
            config.destination_prefix = normalize_prefix(&prefix);
        }
        if let Some(extension) = get("SALES_SYNC_EXTENSION") {
            config.extension = extension.trim_start_matches('.').to_string();
        }
        if let Some(path) = get("SALES_SYNC_LOCAL_LOG") {
            config.local_log_file = PathBuf::from(path);
        }
        config.log_key = get("SALES_SYNC_LOG_KEY").unwrap_or_else(|| {
            format!("{}{}", config.destination_prefix, SyncDefaults::LOG_FILE_NAME)
        });
        if let Some(topic) = get("SALES_SYNC_TOPIC") {
            config.topic_name = topic;
        }
        if let Some(placement) = get("SALES_SYNC_UPLOAD_PLACEMENT") {
            config.placement = placement.parse()?;
        }
        if let Some(hours) = get("SALES_SYNC_INTERVAL_HOURS") {
            config.interval = Some(parse_interval_hours(&hours)?);
        }
        config.s3_endpoint = get("SALES_SYNC_S3_ENDPOINT");

        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the pipeline relies on
    pub fn validate(&self) -> SyncResult<()> {
        if self.bucket.is_empty() {
            return Err(SyncError::config("bucket name must not be empty"));
        }
        if self.destination_prefix.is_empty() || !self.destination_prefix.ends_with('/') {
            return Err(SyncError::config("destination prefix must be non-empty and end with '/'"));
        }
        if !self.email.contains('@') {
            return Err(SyncError::config(format!("{} is not an email address", self.email)));
        }
        // A log object outside the prefix would be picked up and moved by the reorganizer
        if !self.log_key.starts_with(&self.destination_prefix) {
            return Err(SyncError::config(format!(
                "log key {} must live under {}",
                self.log_key, self.destination_prefix
            )));
        }
        Ok(())
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_start_matches('/');
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

fn parse_interval_hours(value: &str) -> SyncResult<Duration> {
    let hours: u64 = value
        .parse()
        .map_err(|_| SyncError::config(format!("SALES_SYNC_INTERVAL_HOURS must be a whole number, got {}", value)))?;
    if hours == 0 {
        return Err(SyncError::config("SALES_SYNC_INTERVAL_HOURS must be at least 1"));
    }
    Ok(Duration::from_secs(hours * 60 * 60))
}
