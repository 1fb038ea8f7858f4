//! Per-run logger.
//!
//! Nothing here installs a global subscriber. A [`RunLogger`] owns a
//! `Dispatch` that the driver attaches to the run future, and hands each
//! component a span tagged with the component's name.

use std::fs::File;
use std::future::Future;
use std::path::Path;
use std::sync::Mutex;

use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing::{Dispatch, Span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::{SyncError, SyncResult};

const DEFAULT_FILTER: &str = "info";

pub struct RunLogger {
    dispatch: Dispatch,
}

impl RunLogger {
    /// Log to `path` (truncated on open) and, when `console` is set, to stdout
    pub fn open<P: AsRef<Path>>(path: P, console: bool) -> SyncResult<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| SyncError::io(path, source))?;

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file));
        let console_layer = console.then(|| fmt::layer().with_target(false));

        let subscriber = Registry::default()
            .with(Self::filter())
            .with(file_layer)
            .with(console_layer);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
        })
    }

    /// Console-only logger for the process around the runs
    pub fn console() -> Self {
        let subscriber = Registry::default()
            .with(Self::filter())
            .with(fmt::layer().with_target(false));
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    fn filter() -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }

    /// Span pre-bound with the component's name; everything logged inside carries it
    pub fn component(&self, name: &'static str) -> Span {
        tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::info_span!("component", component = name)
        })
    }

    /// Run `future` with this logger as its subscriber
    pub fn scope<F: Future>(&self, future: F) -> WithDispatch<F> {
        future.with_subscriber(self.dispatch.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_in_scope_reach_the_file_with_component_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let logger = RunLogger::open(&path, false).unwrap();
        let span = logger.component("uploader");

        logger
            .scope(async {
                let _entered = span.enter();
                tracing::info!("uploaded sr1_x.csv");
            })
            .await;

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("uploaded sr1_x.csv"));
        assert!(content.contains("component=\"uploader\""));
        assert!(content.contains("INFO"));
    }

    #[tokio::test]
    async fn reopening_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");

        let first = RunLogger::open(&path, false).unwrap();
        first.scope(async { tracing::info!("first run") }).await;

        let second = RunLogger::open(&path, false).unwrap();
        second.scope(async { tracing::info!("second run") }).await;

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("first run"));
        assert!(content.contains("second run"));
    }

    #[tokio::test]
    async fn events_outside_scope_are_not_captured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let _logger = RunLogger::open(&path, false).unwrap();

        tracing::info!("not for this run");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.is_empty());
    }
}
