//! Generated design images and the parameters that produced them.
//!
//! Field names follow the backend's JSON: `job_id` is snake_case while
//! the parent link arrives as `parentId` (older payloads use
//! `parent_id`, accepted as an alias).

use serde::{Deserialize, Serialize};

use crate::types::{ImageId, JobId};

/// The generation parameters behind an image.
///
/// Carried forward by refine and modify so a derived job starts from
/// the same context as its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignParameters {
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub lighting: bool,
    #[serde(default)]
    pub description: String,
}

/// A single design result returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub id: ImageId,

    /// Location of the rendered artifact. Empty when the backend only
    /// returned metadata.
    #[serde(default)]
    pub url: String,

    /// Job that produced the image, used to correlate feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<DesignParameters>,

    /// Image this one was derived from. `None` for root results.
    #[serde(
        default,
        rename = "parentId",
        alias = "parent_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<ImageId>,
}

impl GeneratedImage {
    pub fn new(id: impl Into<ImageId>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            job_id: None,
            parameters: None,
            parent_id: None,
        }
    }

    pub fn with_parameters(mut self, parameters: DesignParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<JobId>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Thumbs-up / thumbs-down feedback on an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Up,
    Down,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Up => "up",
            Rating::Down => "down",
        }
    }
}
