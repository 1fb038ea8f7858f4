use std::future::Future;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::info;

/// Fixed-period runner. The first run starts immediately; a run that
/// overshoots the period delays the next one instead of stacking up.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    period: Duration,
    max_runs: Option<u64>,
}

impl Schedule {
    pub fn every(period: Duration) -> Self {
        Self { period, max_runs: None }
    }

    /// Stop after `runs` runs instead of running forever
    pub fn limit(mut self, runs: u64) -> Self {
        self.max_runs = Some(runs);
        self
    }

    /// Drive `job` until the run limit is reached; returns the number of runs
    pub async fn run<F, Fut>(self, mut job: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut runs = 0;
        while self.max_runs.map_or(true, |max| runs < max) {
            ticker.tick().await;
            runs += 1;
            info!(run = runs, period_secs = self.period.as_secs(), "scheduled run starting");
            job().await;
        }
        runs
    }
}

/// Run `job` every `period`, forever
pub async fn run_every<F, Fut>(period: Duration, job: F) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    Schedule::every(period).run(job).await
}
