//! Whole runs through the driver with in-memory providers.

use std::sync::Arc;

use dog_blob::{BlobStore, BucketPlacement, MemoryBlobStore, StoreOp};
use dog_notify::{MemoryNotifier, NotifyOp};
use sales_sync::{Driver, Stage, SyncConfig, SyncError};

struct Run {
    store: MemoryBlobStore,
    notifier: MemoryNotifier,
    config: SyncConfig,
    _dir: tempfile::TempDir,
}

impl Run {
    fn new(files: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let local_dir = dir.path().join("exports");
        std::fs::create_dir(&local_dir).unwrap();
        for name in files {
            std::fs::write(local_dir.join(name), "region,total\nnorth,10\n").unwrap();
        }

        let mut config = SyncConfig::new("rep-manager@example.com");
        config.bucket = "sales-test".to_string();
        config.local_dir = local_dir;
        config.local_log_file = dir.path().join("local_application_logs.log");

        Self {
            store: MemoryBlobStore::new(),
            notifier: MemoryNotifier::new(),
            config,
            _dir: dir,
        }
    }

    fn driver(&self) -> Driver {
        Driver::new(
            self.config.clone(),
            Arc::new(self.store.clone()),
            Arc::new(self.notifier.clone()),
            BucketPlacement::in_region("eu-west-1"),
        )
        .quiet()
    }

    fn local_log(&self) -> String {
        std::fs::read_to_string(&self.config.local_log_file).unwrap()
    }

    fn remote_log(&self) -> Option<String> {
        self.store
            .object(&self.config.bucket, &self.config.log_key)
            .map(|body| String::from_utf8(body.to_vec()).unwrap())
    }
}

#[tokio::test]
async fn full_run_completes_every_stage() {
    let run = Run::new(&["sr1_x.csv", "sr1_y.csv", "sr2_z.csv"]);

    let report = run.driver().run().await.unwrap();

    assert!(report.succeeded(), "{:?}", report);
    assert_eq!(report.completed_stages(), Stage::ALL.to_vec());
    assert!(report.stages.iter().all(|stage| stage.ok));
    assert!(report.finished_at.unwrap() >= report.started_at);

    assert_eq!(
        run.store.placement_of("sales-test"),
        Some(BucketPlacement::in_region("eu-west-1"))
    );
    assert_eq!(
        run.store.keys("sales-test"),
        vec![
            "dct-sales/application_logs.log",
            "dct-sales/sr1/sr1_x.csv",
            "dct-sales/sr1/sr1_y.csv",
            "dct-sales/sr2/sr2_z.csv",
        ]
    );
    assert_eq!(run.notifier.published().len(), 2);

    let topics = run.notifier.topics();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].name(), "EmailSalesRepFromS3Bucket");
    let subscriptions = run.notifier.subscriptions(&topics[0]);
    assert_eq!(subscriptions.len(), 1);
    assert!(subscriptions[0].is_pending());

    let reorganize = report.stage(Stage::Reorganize).unwrap();
    assert!(reorganize.message.starts_with("Moved 3 file(s) for 2 owner(s)"));
}

#[tokio::test]
async fn run_log_is_tagged_by_component_and_shipped() {
    let run = Run::new(&["sr1_x.csv"]);

    run.driver().run().await.unwrap();

    let remote = run.remote_log().unwrap();
    assert!(remote.contains("component=\"uploader\""));
    assert!(remote.contains("component=\"reorganizer\""));
    assert!(remote.contains("Uploaded sr1_x.csv"));
    assert!(remote.contains("Successfully moved sr1_x.csv to dct-sales/sr1/sr1_x.csv."));

    // the report is logged after shipping, so only the local file has it
    let local = run.local_log();
    assert!(local.contains("run finished"));
    assert!(!remote.contains("run finished"));
}

#[tokio::test]
async fn remote_log_accumulates_across_runs() {
    let run = Run::new(&["sr1_x.csv"]);

    run.driver().run().await.unwrap();
    let first = run.remote_log().unwrap();

    run.notifier
        .confirm(&run.notifier.topics()[0], "rep-manager@example.com");
    let report = run.driver().run().await.unwrap();
    assert!(report.succeeded());

    let second = run.remote_log().unwrap();
    assert!(second.starts_with(&first));
    assert!(second.len() > first.len());
    assert!(second.contains("No need to upload. Files already exist."));
    assert!(report.stage(Stage::Subscription).unwrap().message.starts_with("already subscribed"));
    assert_eq!(run.notifier.published().len(), 1);
}

#[tokio::test]
async fn failed_stage_halts_the_run() {
    let run = Run::new(&["sr1_x.csv"]);
    run.notifier.fail_on(NotifyOp::Subscribe);

    let report = run.driver().run().await.unwrap();

    assert!(!report.succeeded());
    assert_eq!(report.failed_stage, Some(Stage::Subscription));
    assert_eq!(report.completed_stages(), vec![Stage::Topic, Stage::Subscription]);
    assert!(!run.store.bucket_exists("sales-test").await.unwrap());

    let log = run.local_log();
    assert!(log.contains("Failed to subscribe email: Subscribe failed"));
    assert!(log.contains("Exiting..."));
}

#[tokio::test]
async fn upload_failure_leaves_earlier_stages_in_place() {
    let run = Run::new(&["sr1_x.csv", "sr2_z.csv"]);
    run.store.fail_on(StoreOp::Put, Some("sr2_z.csv"));

    let report = run.driver().run().await.unwrap();

    assert_eq!(report.failed_stage, Some(Stage::Upload));
    let upload = report.stage(Stage::Upload).unwrap();
    assert!(upload.message.starts_with("Failed to upload files: 1 file(s) failed to upload"));

    // bucket stays, uploaded file is not reorganized, no log shipped
    assert_eq!(run.store.keys("sales-test"), vec!["sr1_x.csv"]);
    assert!(run.notifier.published().is_empty());
    assert!(run.remote_log().is_none());
}

#[tokio::test]
async fn existing_bucket_is_reused() {
    let run = Run::new(&[]);
    run.store.insert("sales-test", "dct-sales/sr1/sr1_old.csv", "x");

    let report = run.driver().run().await.unwrap();

    assert!(report.succeeded());
    assert_eq!(run.store.placement_of("sales-test"), None);
    assert_eq!(
        report.stage(Stage::Bucket).unwrap().message,
        "Bucket sales-test already exists"
    );
    assert_eq!(
        report.stage(Stage::Upload).unwrap().message,
        "No need to upload. Files already exist."
    );
    assert_eq!(
        report.stage(Stage::Reorganize).unwrap().message,
        "No files were moved or deleted."
    );
}

#[tokio::test]
async fn report_serializes_stage_names() {
    let run = Run::new(&[]);
    let report = run.driver().run().await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stages"][0]["stage"], "topic");
    assert_eq!(json["stages"][5]["stage"], "ship_log");
    assert!(json["failed_stage"].is_null());
}

#[tokio::test]
async fn log_key_outside_prefix_is_rejected_before_any_stage() {
    let mut run = Run::new(&["sr1_x.csv"]);
    run.config.log_key = "logs/app.log".to_string();

    let err = run.driver().run().await.unwrap_err();

    assert!(matches!(err, SyncError::Config(_)));
    assert!(err.to_string().contains("must live under dct-sales/"));
    assert!(!run.store.bucket_exists("sales-test").await.unwrap());
    assert!(run.notifier.topics().is_empty());
    assert!(run.store.keys("sales-test").is_empty());
}
