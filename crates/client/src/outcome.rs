//! Terminal results of a polled generation job.
//!
//! A [`PollOutcome`] is delivered to whoever started the poll through
//! its [`PollHandle`](crate::poller::PollHandle). Cancelled polls produce
//! no outcome at all: cancellation is not a failure.

use designflow_core::hierarchy::MergeReport;
use designflow_core::types::{ImageId, JobId};

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The job succeeded and its images were merged into the store.
    Resolved {
        job_id: JobId,
        parent_id: Option<ImageId>,
        /// Ids of the images the backend returned, in order.
        image_ids: Vec<ImageId>,
        report: MergeReport,
    },

    /// Polling stopped on an error.
    Failed { job_id: JobId, error: PollError },

    /// The configured attempt limit ran out before a terminal status.
    TimedOut { job_id: JobId, attempts: u32 },
}

impl PollOutcome {
    pub fn job_id(&self) -> &str {
        match self {
            PollOutcome::Resolved { job_id, .. }
            | PollOutcome::Failed { job_id, .. }
            | PollOutcome::TimedOut { job_id, .. } => job_id,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, PollOutcome::Resolved { .. })
    }
}

/// Why polling stopped without a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    /// The backend reported the job as failed.
    #[error("Generation failed: {0}")]
    JobFailed(String),

    /// The status request itself failed (network, non-2xx, bad body).
    #[error("Status check failed: {0}")]
    Transport(String),

    /// The backend returned a status outside the known set.
    #[error("Backend returned unknown job status '{0}'")]
    UnknownStatus(String),

    /// The job succeeded but the response carried no images.
    #[error("Job succeeded without returning images")]
    MissingImages,
}
