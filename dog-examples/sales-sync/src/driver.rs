//! Top-level run: topic, subscription, bucket, upload, reorganize, ship log.
//!
//! Stages run strictly in order. The first failing stage is logged and ends
//! the run; nothing done by earlier stages is undone.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dog_blob::{BlobStore, BucketPlacement};
use dog_notify::{get_or_create_topic, subscribe_email, Notifier};
use serde::Serialize;
use tracing::{error, info, warn, Instrument};

use crate::bucket::ensure_bucket;
use crate::log_shipper::LogShipper;
use crate::logging::RunLogger;
use crate::reorganizer::Reorganizer;
use crate::uploader::Uploader;
use crate::{SyncConfig, SyncResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Topic,
    Subscription,
    Bucket,
    Upload,
    Reorganize,
    ShipLog,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Topic,
        Stage::Subscription,
        Stage::Bucket,
        Stage::Upload,
        Stage::Reorganize,
        Stage::ShipLog,
    ];

    /// Prefix logged in front of the error when this stage fails
    pub fn failure_context(self) -> &'static str {
        match self {
            Stage::Topic => "Failed to retrieve or create the SNS topic",
            Stage::Subscription => "Failed to subscribe email",
            Stage::Bucket => "Failed to check/create bucket",
            Stage::Upload => "Failed to upload files",
            Stage::Reorganize => "Failed to move files",
            Stage::ShipLog => "Failed to upload log file",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Stage::Topic => "topic",
            Stage::Subscription => "subscription",
            Stage::Bucket => "bucket",
            Stage::Upload => "upload",
            Stage::Reorganize => "reorganize",
            Stage::ShipLog => "ship_log",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub ok: bool,
    pub message: String,
}

/// Everything one run did, in stage order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub stages: Vec<StageReport>,
    pub failed_stage: Option<Stage>,
}

impl RunReport {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            stages: Vec::new(),
            failed_stage: None,
        }
    }

    fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn succeeded(&self) -> bool {
        self.failed_stage.is_none()
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }

    /// Stages that ran, failed one included
    pub fn completed_stages(&self) -> Vec<Stage> {
        self.stages.iter().map(|report| report.stage).collect()
    }
}

pub struct Driver {
    config: SyncConfig,
    store: Arc<dyn BlobStore>,
    notifier: Arc<dyn Notifier>,
    placement: BucketPlacement,
    console: bool,
}

impl Driver {
    pub fn new(
        config: SyncConfig,
        store: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
        placement: BucketPlacement,
    ) -> Self {
        Self {
            config,
            store,
            notifier,
            placement,
            console: true,
        }
    }

    /// Log to the local file only
    pub fn quiet(mut self) -> Self {
        self.console = false;
        self
    }

    /// Run every stage once.
    ///
    /// `Err` is returned when the configuration is invalid or the run log
    /// cannot be opened; stage failures are reported through
    /// [`RunReport::failed_stage`].
    pub async fn run(&self) -> SyncResult<RunReport> {
        self.config.validate()?;
        let logger = RunLogger::open(&self.config.local_log_file, self.console)?;
        let report = logger.scope(self.run_stages(&logger)).await;
        Ok(report)
    }

    async fn run_stages(&self, logger: &RunLogger) -> RunReport {
        let span = logger.component("driver");
        let mut report = RunReport::start();
        self.drive(logger, &mut report).instrument(span.clone()).await;
        let report = report.finish();

        let _entered = span.enter();
        match serde_json::to_string(&report) {
            Ok(json) => info!(report = %json, succeeded = report.succeeded(), "run finished"),
            Err(err) => warn!("could not serialize run report: {}", err),
        }
        report
    }

    async fn drive(&self, logger: &RunLogger, report: &mut RunReport) {
        let config = &self.config;
        let notifier_span = logger.component("notifier");

        let topic: SyncResult<_> = get_or_create_topic(&*self.notifier, &config.topic_name)
            .instrument(notifier_span.clone())
            .await
            .map_err(Into::into);
        let Some(topic) = record(report, Stage::Topic, topic, |arn| format!("Using topic {}", arn)) else {
            return;
        };

        let subscription: SyncResult<_> = subscribe_email(&*self.notifier, &topic, &config.email)
            .instrument(notifier_span)
            .await
            .map_err(Into::into);
        if record(report, Stage::Subscription, subscription, |status| {
            format!("{} ({})", status, config.email)
        })
        .is_none()
        {
            return;
        }

        let bucket = ensure_bucket(self.store.as_ref(), &config.bucket, &self.placement)
            .instrument(logger.component("bucket"))
            .await;
        if record(report, Stage::Bucket, bucket, |status| {
            format!("Bucket {} {}", config.bucket, status)
        })
        .is_none()
        {
            return;
        }

        let uploader = Uploader::new(self.store.clone(), logger.component("uploader"))
            .with_extension(config.extension.clone())
            .with_placement(config.placement);
        let upload = uploader
            .upload(&config.bucket, &config.local_dir, &config.destination_prefix)
            .await;
        if record(report, Stage::Upload, upload, ToString::to_string).is_none() {
            return;
        }

        let reorganizer = Reorganizer::new(
            self.store.clone(),
            self.notifier.clone(),
            logger.component("reorganizer"),
        );
        let moved = reorganizer
            .reorganize(&config.bucket, &config.destination_prefix, &topic)
            .await;
        if record(report, Stage::Reorganize, moved, ToString::to_string).is_none() {
            return;
        }

        let shipper = LogShipper::new(self.store.clone(), logger.component("log_shipper"));
        let shipped = shipper
            .ship(&config.bucket, &config.log_key, &config.local_log_file)
            .await;
        record(report, Stage::ShipLog, shipped, |log| {
            format!("Log file uploaded to s3://{}/{}", config.bucket, log.key)
        });
    }
}

fn record<T, F>(report: &mut RunReport, stage: Stage, result: SyncResult<T>, describe: F) -> Option<T>
where
    F: FnOnce(&T) -> String,
{
    match result {
        Ok(value) => {
            let message = describe(&value);
            info!(%stage, "{}", message);
            report.stages.push(StageReport {
                stage,
                ok: true,
                message,
            });
            Some(value)
        }
        Err(err) => {
            let message = format!("{}: {}", stage.failure_context(), err);
            error!(%stage, "{}. Exiting...", message);
            report.stages.push(StageReport {
                stage,
                ok: false,
                message,
            });
            report.failed_stage = Some(stage);
            None
        }
    }
}
