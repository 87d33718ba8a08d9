use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Status of an image analysis job.
///
/// `Pending`, `Succeeded` and `Failed` correspond to the markers the status
/// endpoint reports; `TimedOut` is assigned locally when the polling budget
/// runs out before the backend reaches a terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed,
    TimedOut,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// One image analysis request/response lifecycle.
///
/// Created when the upload returns a task id; mutated only by the poller;
/// discarded once a terminal state has been consumed. Re-submitting an image
/// always creates a fresh job with a fresh id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub task_id: String,
    pub status: JobStatus,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(task_id: String) -> Self {
        Self {
            task_id,
            status: JobStatus::Pending,
            attempts: 0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_pending() {
        let job = Job::new("task-9".to_string());
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 0);
        assert!(!job.status.is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::TimedOut.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
    }
}
