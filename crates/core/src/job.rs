//! Generation job status and transient job tracking.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;

use crate::types::{ImageId, JobId, Timestamp};

/// Status strings reported by the job-status endpoint.
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_SUCCEEDED: &str = "succeeded";
pub const STATUS_FAILED: &str = "failed";

/// Lifecycle status of a backend generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => STATUS_PENDING,
            JobStatus::Processing => STATUS_PROCESSING,
            JobStatus::Succeeded => STATUS_SUCCEEDED,
            JobStatus::Failed => STATUS_FAILED,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when the backend reports a status outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown job status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(JobStatus::Pending),
            STATUS_PROCESSING => Ok(JobStatus::Processing),
            STATUS_SUCCEEDED => Ok(JobStatus::Succeeded),
            STATUS_FAILED => Ok(JobStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A job the poller is currently tracking.
///
/// Lives only while the job is in flight; dropped on a terminal status
/// or on cancellation.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub job_id: JobId,
    /// Image the job derives from, or `None` for an initial generation.
    pub parent_id: Option<ImageId>,
    pub status: JobStatus,
    /// Number of status checks issued so far.
    pub attempts: u32,
    pub started_at: Timestamp,
}

impl GenerationJob {
    pub fn new(job_id: impl Into<JobId>, parent_id: Option<ImageId>) -> Self {
        Self {
            job_id: job_id.into(),
            parent_id,
            status: JobStatus::Pending,
            attempts: 0,
            started_at: Utc::now(),
        }
    }

    /// Milliseconds since the job was accepted.
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses() {
        assert_eq!("pending".parse::<JobStatus>(), Ok(JobStatus::Pending));
        assert_eq!("processing".parse::<JobStatus>(), Ok(JobStatus::Processing));
        assert_eq!("succeeded".parse::<JobStatus>(), Ok(JobStatus::Succeeded));
        assert_eq!("failed".parse::<JobStatus>(), Ok(JobStatus::Failed));
    }

    #[test]
    fn unknown_status_keeps_raw_value() {
        let err = "queued".parse::<JobStatus>().unwrap_err();
        assert_eq!(err, UnknownStatus("queued".to_string()));
        assert_eq!(err.to_string(), "Unknown job status 'queued'");
    }

    #[test]
    fn status_displays_wire_value() {
        assert_eq!(JobStatus::Processing.to_string(), "processing");
        assert_eq!(JobStatus::Succeeded.as_str(), STATUS_SUCCEEDED);
    }

    #[test]
    fn new_job_starts_pending() {
        let job = GenerationJob::new("J1", Some("I1".to_string()));
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 0);
        assert_eq!(job.parent_id.as_deref(), Some("I1"));
        assert!(job.elapsed_ms() >= 0);
    }
}
