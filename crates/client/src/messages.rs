//! Request and response bodies of the design backend's HTTP API.

use serde::{Deserialize, Serialize};

use designflow_core::generation::GenerationRequest;
use designflow_core::image::{DesignParameters, GeneratedImage, Rating};
use designflow_core::job::{JobStatus, UnknownStatus};
use designflow_core::types::{ImageId, JobId};

/// Body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratePayload {
    pub description: String,
    pub features: FeatureSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image_id: Option<ImageId>,
}

/// Style selections nested under `features` in [`GeneratePayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub style: String,
    pub color: String,
    pub lighting: bool,
}

impl From<&GenerationRequest> for GeneratePayload {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            description: request.description.clone(),
            features: FeatureSet {
                style: request.style.clone(),
                color: request.color.clone(),
                lighting: request.lighting,
            },
            base64_image: request.base64_image.clone(),
            reference_image_id: request.reference_image_id.clone(),
        }
    }
}

/// Body of `POST /generate/variants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPayload {
    pub reference_image_id: ImageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_parameters: Option<DesignParameters>,
}

/// Response of both generation endpoints once the job is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGenerationResponse {
    pub job_id: JobId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of `GET /jobs/{job_id}/status`.
///
/// `status` is kept as the raw string so that values outside the known
/// set can be reported verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub status: String,
    /// Present once the job has succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<GeneratedImage>>,
    /// Present once the job has failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatusResponse {
    pub fn new(status: JobStatus) -> Self {
        Self {
            job_id: None,
            status: status.as_str().to_string(),
            images: None,
            error: None,
        }
    }

    pub fn succeeded(images: Vec<GeneratedImage>) -> Self {
        Self {
            images: Some(images),
            ..Self::new(JobStatus::Succeeded)
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(JobStatus::Failed)
        }
    }

    pub fn parsed_status(&self) -> Result<JobStatus, UnknownStatus> {
        self.status.parse()
    }
}

/// Body of `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    /// Job that produced the rated image.
    pub generation_id: JobId,
    pub image_id: ImageId,
    pub rating: Rating,
}

/// Body of `POST /designs/save`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDesignPayload {
    pub image_id: ImageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Acknowledgement returned by the feedback and save endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_payload_nests_features_and_omits_absent_fields() {
        let request = GenerationRequest::new("hexagonal mesh", "gaming", "black", true);
        let json = serde_json::to_value(GeneratePayload::from(&request)).unwrap();

        assert_eq!(json["description"], "hexagonal mesh");
        assert_eq!(json["features"]["style"], "gaming");
        assert_eq!(json["features"]["color"], "black");
        assert_eq!(json["features"]["lighting"], true);
        assert!(json.get("base64_image").is_none());
        assert!(json.get("reference_image_id").is_none());
    }

    #[test]
    fn generate_payload_carries_reference_and_upload() {
        let request = GenerationRequest::new("", "gaming", "black", false)
            .with_reference("I1")
            .with_base64_image("aGVsbG8=");
        let json = serde_json::to_value(GeneratePayload::from(&request)).unwrap();

        assert_eq!(json["reference_image_id"], "I1");
        assert_eq!(json["base64_image"], "aGVsbG8=");
    }

    #[test]
    fn status_response_parses_succeeded_payload() {
        let raw = r#"{
            "job_id": "J1",
            "status": "succeeded",
            "images": [
                {"id": "I1", "url": "u1"},
                {"id": "I2", "parentId": "I1", "parameters": {"style": "s", "color": "c", "lighting": true, "description": "d"}}
            ]
        }"#;
        let response: JobStatusResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(response.parsed_status(), Ok(JobStatus::Succeeded));
        let images = response.images.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].parent_id.as_deref(), Some("I1"));
        assert!(images[1].parameters.as_ref().unwrap().lighting);
    }

    #[test]
    fn status_response_keeps_unknown_status_raw() {
        let response: JobStatusResponse =
            serde_json::from_str(r#"{"status": "exploded"}"#).unwrap();
        assert_eq!(
            response.parsed_status(),
            Err(UnknownStatus("exploded".to_string()))
        );
        assert!(response.images.is_none());
    }

    #[test]
    fn feedback_payload_uses_generation_id() {
        let payload = FeedbackPayload {
            generation_id: "J1".to_string(),
            image_id: "I1".to_string(),
            rating: Rating::Down,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"generation_id": "J1", "image_id": "I1", "rating": "down"}));
    }

    #[test]
    fn action_response_tolerates_missing_fields() {
        let response: ActionResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(response.status, "ok");
        assert_eq!(response.message, "");
    }
}
