//! Bounded fixed-interval polling of an analysis job.

use std::time::Duration;

use crate::error::ApiError;
use crate::models::job::{Job, JobStatus};

/// Delay between status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Status checks before giving up on a job that stays pending.
pub const MAX_POLL_TICKS: u32 = 30;

/// Where status checks come from. The production source is the API client;
/// tests script one.
#[allow(async_fn_in_trait)]
pub trait StatusSource {
    async fn job_status(&self, task_id: &str) -> Result<JobStatus, ApiError>;
}

/// Drives one job to a terminal state.
///
/// Ticks are strictly sequential: a check is only issued after the previous
/// response has been processed. One poller serves one job lifetime;
/// re-submitting an image creates a new job and a new poller.
pub struct JobPoller<S> {
    source: S,
    interval: Duration,
    max_ticks: u32,
}

impl<S: StatusSource> JobPoller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            interval: POLL_INTERVAL,
            max_ticks: MAX_POLL_TICKS,
        }
    }

    /// Override the tick timing. Used by tests; production callers keep the
    /// defaults.
    pub fn with_timing(source: S, interval: Duration, max_ticks: u32) -> Self {
        Self {
            source,
            interval,
            max_ticks,
        }
    }

    /// Poll until the job reaches a terminal state or the tick budget runs
    /// out, mutating the job's status and attempt counter along the way.
    ///
    /// `Failed` and `TimedOut` both surface as errors but stay
    /// distinguishable: a timeout means the backend is still processing,
    /// a failure means it gave up on the image.
    pub async fn wait_for_result(&self, job: &mut Job) -> Result<(), ApiError> {
        loop {
            job.attempts += 1;
            let status = self.source.job_status(&job.task_id).await?;

            match status {
                JobStatus::Succeeded => {
                    job.status = JobStatus::Succeeded;
                    tracing::info!(
                        task_id = %job.task_id,
                        attempts = job.attempts,
                        "analysis finished"
                    );
                    return Ok(());
                }
                JobStatus::Failed | JobStatus::TimedOut => {
                    job.status = JobStatus::Failed;
                    tracing::warn!(
                        task_id = %job.task_id,
                        marker = %status,
                        attempts = job.attempts,
                        "analysis reported failure"
                    );
                    return Err(ApiError::AnalysisFailed);
                }
                JobStatus::Pending => {
                    if job.attempts >= self.max_ticks {
                        job.status = JobStatus::TimedOut;
                        tracing::warn!(
                            task_id = %job.task_id,
                            attempts = job.attempts,
                            "gave up waiting for analysis"
                        );
                        return Err(ApiError::Timeout);
                    }
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}
