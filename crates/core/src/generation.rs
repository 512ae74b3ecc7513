//! Generation requests: validation and parameter carry-forward.
//!
//! A request needs either a description or a reference image, plus a
//! style and a color. Modify requests start from an existing image's
//! [`DesignParameters`] and overlay whatever the user changed.

use crate::error::CoreError;
use crate::image::{DesignParameters, GeneratedImage};
use crate::types::ImageId;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum allowed length for a free-text design description.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Everything needed to ask the backend for a new set of designs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub description: String,
    pub style: String,
    pub color: String,
    pub lighting: bool,
    /// Existing image the generation should be based on.
    pub reference_image_id: Option<ImageId>,
    /// Uploaded reference picture, already base64-encoded (no data-URL prefix).
    pub base64_image: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        description: impl Into<String>,
        style: impl Into<String>,
        color: impl Into<String>,
        lighting: bool,
    ) -> Self {
        Self {
            description: description.into(),
            style: style.into(),
            color: color.into(),
            lighting,
            reference_image_id: None,
            base64_image: None,
        }
    }

    /// Build a request from stored parameters, referencing `image_id`.
    pub fn from_parameters(parameters: &DesignParameters, image_id: impl Into<ImageId>) -> Self {
        Self {
            description: parameters.description.clone(),
            style: parameters.style.clone(),
            color: parameters.color.clone(),
            lighting: parameters.lighting,
            reference_image_id: Some(image_id.into()),
            base64_image: None,
        }
    }

    pub fn with_reference(mut self, image_id: impl Into<ImageId>) -> Self {
        self.reference_image_id = Some(image_id.into());
        self
    }

    pub fn with_base64_image(mut self, base64_image: impl Into<String>) -> Self {
        self.base64_image = Some(base64_image.into());
        self
    }
}

/// Validate a request before it is sent to the backend.
///
/// - A description or a reference image must be supplied.
/// - Style and color must be non-blank.
/// - The description must not exceed [`MAX_DESCRIPTION_LENGTH`].
pub fn validate_generation_request(request: &GenerationRequest) -> Result<(), CoreError> {
    let has_reference =
        request.reference_image_id.is_some() || request.base64_image.is_some();
    if request.description.trim().is_empty() && !has_reference {
        return Err(CoreError::Validation(
            "A design description or a reference image is required".to_string(),
        ));
    }
    if request.style.trim().is_empty() {
        return Err(CoreError::Validation("Style must not be empty".to_string()));
    }
    if request.color.trim().is_empty() {
        return Err(CoreError::Validation("Color must not be empty".to_string()));
    }
    if request.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description must not exceed {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Modify
// ---------------------------------------------------------------------------

/// User edits applied on top of an image's parameters. `None` keeps the
/// original value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterOverrides {
    pub style: Option<String>,
    pub color: Option<String>,
    pub lighting: Option<bool>,
    pub description: Option<String>,
}

impl ParameterOverrides {
    pub fn apply(&self, base: &DesignParameters) -> DesignParameters {
        DesignParameters {
            style: self.style.clone().unwrap_or_else(|| base.style.clone()),
            color: self.color.clone().unwrap_or_else(|| base.color.clone()),
            lighting: self.lighting.unwrap_or(base.lighting),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| base.description.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.style.is_none()
            && self.color.is_none()
            && self.lighting.is_none()
            && self.description.is_none()
    }
}

/// Build the request for "modify and regenerate" on `image`.
///
/// Images without stored parameters start from defaults, so the caller's
/// overrides must then supply style and color for validation to pass.
pub fn modify_request(image: &GeneratedImage, overrides: &ParameterOverrides) -> GenerationRequest {
    let base = image.parameters.clone().unwrap_or_default();
    GenerationRequest::from_parameters(&overrides.apply(&base), image.id.clone())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
