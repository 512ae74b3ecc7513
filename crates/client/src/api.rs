//! REST API client for the design backend.
//!
//! Wraps the backend's HTTP endpoints (generation, variant generation,
//! job status, feedback, save) using [`reqwest`].

use std::time::Duration;

use designflow_core::generation::GenerationRequest;

use crate::messages::{
    ActionResponse, FeedbackPayload, GeneratePayload, JobStatusResponse, SaveDesignPayload,
    StartGenerationResponse, VariantPayload,
};

/// HTTP client for a single design backend.
#[derive(Clone)]
pub struct DesignApi {
    client: reqwest::Client,
    api_url: String,
    /// Sent as `Authorization: Bearer <token>` when set.
    token: Option<String>,
}

/// Errors from the design REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum DesignApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Design API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl DesignApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base URL including the API prefix, e.g.
    ///   `http://host:5000/api`. A trailing slash is ignored.
    /// * `timeout` - Per-request timeout applied to every call.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, DesignApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            api_url,
            token: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Start an initial (or reference-based) generation.
    ///
    /// Sends `POST /generate` and returns the backend-assigned job id.
    pub async fn start_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<StartGenerationResponse, DesignApiError> {
        let body = GeneratePayload::from(request);
        let response = self
            .request(reqwest::Method::POST, "/generate")
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Ask for variants of an existing image.
    ///
    /// Sends `POST /generate/variants`.
    pub async fn generate_variants(
        &self,
        payload: &VariantPayload,
    ) -> Result<StartGenerationResponse, DesignApiError> {
        let response = self
            .request(reqwest::Method::POST, "/generate/variants")
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the current status of a generation job.
    ///
    /// Sends `GET /jobs/{job_id}/status`.
    pub async fn check_status(&self, job_id: &str) -> Result<JobStatusResponse, DesignApiError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/jobs/{job_id}/status"))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Sends `POST /feedback`.
    pub async fn submit_feedback(
        &self,
        payload: &FeedbackPayload,
    ) -> Result<ActionResponse, DesignApiError> {
        let response = self
            .request(reqwest::Method::POST, "/feedback")
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Sends `POST /designs/save`.
    pub async fn save_design(
        &self,
        payload: &SaveDesignPayload,
    ) -> Result<ActionResponse, DesignApiError> {
        let response = self
            .request(reqwest::Method::POST, "/designs/save")
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.api_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`DesignApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, DesignApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(DesignApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DesignApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
