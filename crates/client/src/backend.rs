//! The seam between the design session and the backend.
//!
//! [`DesignBackend`] is what the polling controller and the session talk
//! to. [`DesignApi`] implements it over HTTP; tests substitute scripted
//! doubles.

use async_trait::async_trait;

use designflow_core::generation::GenerationRequest;
use designflow_core::image::{DesignParameters, Rating};
use designflow_core::types::JobId;

use crate::api::{DesignApi, DesignApiError};
use crate::messages::{FeedbackPayload, JobStatusResponse, SaveDesignPayload, VariantPayload};

#[async_trait]
pub trait DesignBackend: Send + Sync {
    /// Submit a generation request. Returns the accepted job's id.
    async fn start_generation(&self, request: &GenerationRequest) -> Result<JobId, DesignApiError>;

    /// Request variants of `reference_image_id`. Returns the accepted job's id.
    async fn generate_variants(
        &self,
        reference_image_id: &str,
        base_parameters: Option<&DesignParameters>,
    ) -> Result<JobId, DesignApiError>;

    async fn check_status(&self, job_id: &str) -> Result<JobStatusResponse, DesignApiError>;

    async fn submit_feedback(
        &self,
        job_id: &str,
        image_id: &str,
        rating: Rating,
    ) -> Result<(), DesignApiError>;

    async fn save_design(&self, image_id: &str, name: Option<&str>) -> Result<(), DesignApiError>;
}

#[async_trait]
impl DesignBackend for DesignApi {
    async fn start_generation(&self, request: &GenerationRequest) -> Result<JobId, DesignApiError> {
        let response = DesignApi::start_generation(self, request).await?;
        tracing::info!(job_id = %response.job_id, "Generation accepted by backend");
        Ok(response.job_id)
    }

    async fn generate_variants(
        &self,
        reference_image_id: &str,
        base_parameters: Option<&DesignParameters>,
    ) -> Result<JobId, DesignApiError> {
        let payload = VariantPayload {
            reference_image_id: reference_image_id.to_string(),
            base_parameters: base_parameters.cloned(),
        };
        let response = DesignApi::generate_variants(self, &payload).await?;
        tracing::info!(
            job_id = %response.job_id,
            reference_image_id,
            "Variant generation accepted by backend",
        );
        Ok(response.job_id)
    }

    async fn check_status(&self, job_id: &str) -> Result<JobStatusResponse, DesignApiError> {
        DesignApi::check_status(self, job_id).await
    }

    async fn submit_feedback(
        &self,
        job_id: &str,
        image_id: &str,
        rating: Rating,
    ) -> Result<(), DesignApiError> {
        let payload = FeedbackPayload {
            generation_id: job_id.to_string(),
            image_id: image_id.to_string(),
            rating,
        };
        let response = DesignApi::submit_feedback(self, &payload).await?;
        tracing::debug!(image_id, status = %response.status, "Feedback acknowledged");
        Ok(())
    }

    async fn save_design(&self, image_id: &str, name: Option<&str>) -> Result<(), DesignApiError> {
        let payload = SaveDesignPayload {
            image_id: image_id.to_string(),
            name: name.map(str::to_string),
        };
        let response = DesignApi::save_design(self, &payload).await?;
        tracing::debug!(image_id, status = %response.status, "Save acknowledged");
        Ok(())
    }
}
