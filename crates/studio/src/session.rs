//! A design session: the store, the poller and the per-image action flags.
//!
//! User actions (generate, refine, modify, feedback, save) enter here.
//! Generation-type actions start a backend job and hand it to the
//! [`PollingController`]; the caller awaits the returned [`PollHandle`]
//! to learn how the job ended. Feedback and save update the local flags
//! first and roll them back when the backend call fails.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use designflow_client::api::{DesignApi, DesignApiError};
use designflow_client::backend::DesignBackend;
use designflow_client::poller::{PollConfig, PollHandle, PollState, PollingController, SharedStore};
use designflow_core::actions::ActionFlags;
use designflow_core::error::CoreError;
use designflow_core::generation::{modify_request, validate_generation_request, GenerationRequest, ParameterOverrides};
use designflow_core::hierarchy::{DesignNode, HierarchyStore};
use designflow_core::image::{GeneratedImage, Rating};
use designflow_core::layout::{layout_hierarchy, Layout, LayoutConfig};

use crate::config::StudioConfig;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Api(#[from] DesignApiError),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    /// Feedback needs the job that produced the image.
    #[error("Image {0} has no generation job to attach feedback to")]
    MissingJobId(String),
}

/// Counts shown alongside the hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub roots: usize,
    pub variants: usize,
    pub rated: usize,
    pub saved: usize,
}

pub struct DesignSession {
    backend: Arc<dyn DesignBackend>,
    store: SharedStore,
    flags: Mutex<ActionFlags>,
    poller: PollingController,
    layout_config: LayoutConfig,
}

impl DesignSession {
    pub fn new(backend: Arc<dyn DesignBackend>, poll: PollConfig, layout_config: LayoutConfig) -> Self {
        let store: SharedStore = Arc::new(RwLock::new(HierarchyStore::new()));
        let poller = PollingController::new(Arc::clone(&backend), Arc::clone(&store), poll);
        Self {
            backend,
            store,
            flags: Mutex::new(ActionFlags::new()),
            poller,
            layout_config,
        }
    }

    /// Build a session talking to the HTTP backend described by `config`.
    pub fn from_config(config: &StudioConfig) -> Result<Self, SessionError> {
        let mut api = DesignApi::new(config.api_url.as_str(), config.request_timeout())?;
        if let Some(token) = &config.api_token {
            api = api.with_token(token.as_str());
        }
        Ok(Self::new(Arc::new(api), config.poll.clone(), config.layout))
    }

    // ---- generation ----

    /// Start an initial generation. Results become new roots.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<PollHandle, SessionError> {
        validate_generation_request(request)?;
        let job_id = self.backend.start_generation(request).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to start generation");
        })?;
        Ok(self.poller.start(job_id, None).await)
    }

    /// Ask for variants of an existing image, at any depth.
    pub async fn refine(&self, image_id: &str) -> Result<PollHandle, SessionError> {
        let image = self.require_image(image_id).await?;
        let job_id = self
            .backend
            .generate_variants(&image.id, image.parameters.as_ref())
            .await
            .inspect_err(|e| {
                tracing::error!(image_id, error = %e, "Failed to start variant generation");
            })?;
        tracing::info!(image_id, job_id = %job_id, "Refining design");
        Ok(self.poller.start(job_id, Some(image.id)).await)
    }

    /// Generate from an image's parameters with `overrides` applied.
    /// Results nest under the modified image.
    pub async fn modify(
        &self,
        image_id: &str,
        overrides: &ParameterOverrides,
    ) -> Result<PollHandle, SessionError> {
        let image = self.require_image(image_id).await?;
        let request = modify_request(&image, overrides);
        validate_generation_request(&request)?;
        let job_id = self.backend.start_generation(&request).await.inspect_err(|e| {
            tracing::error!(image_id, error = %e, "Failed to start modified generation");
        })?;
        tracing::info!(image_id, job_id = %job_id, "Modifying design");
        Ok(self.poller.start(job_id, Some(image.id)).await)
    }

    // ---- feedback / save ----

    /// Rate an image once. The rating is recorded before the backend call
    /// and removed again if the call fails.
    pub async fn submit_feedback(&self, image_id: &str, rating: Rating) -> Result<(), SessionError> {
        let image = self.require_image(image_id).await?;
        let job_id = image
            .job_id
            .clone()
            .filter(|job_id| !job_id.is_empty())
            .ok_or_else(|| SessionError::MissingJobId(image.id.clone()))?;

        self.flags.lock().await.mark_rated(&image.id, rating)?;

        if let Err(e) = self.backend.submit_feedback(&job_id, &image.id, rating).await {
            tracing::error!(image_id, error = %e, "Feedback failed, rolling back");
            self.flags.lock().await.rollback_rating(&image.id);
            return Err(e.into());
        }
        tracing::info!(image_id, rating = rating.as_str(), "Feedback recorded");
        Ok(())
    }

    /// Save an image, optionally under a name. Rolled back on failure.
    pub async fn save(&self, image_id: &str, name: Option<&str>) -> Result<(), SessionError> {
        let image = self.require_image(image_id).await?;

        self.flags.lock().await.mark_saved(&image.id)?;

        if let Err(e) = self.backend.save_design(&image.id, name).await {
            tracing::error!(image_id, error = %e, "Save failed, rolling back");
            self.flags.lock().await.rollback_saved(&image.id);
            return Err(e.into());
        }
        tracing::info!(image_id, "Design saved");
        Ok(())
    }

    pub async fn rating(&self, image_id: &str) -> Option<Rating> {
        self.flags.lock().await.rating(image_id)
    }

    pub async fn is_saved(&self, image_id: &str) -> bool {
        self.flags.lock().await.is_saved(image_id)
    }

    // ---- views ----

    pub async fn find(&self, image_id: &str) -> Option<GeneratedImage> {
        self.store.read().await.find(image_id).cloned()
    }

    pub async fn snapshot(&self) -> Vec<DesignNode> {
        self.store.read().await.snapshot()
    }

    pub async fn layout(&self) -> Layout {
        layout_hierarchy(&*self.store.read().await, &self.layout_config)
    }

    pub async fn summary(&self) -> SessionSummary {
        let (roots, variants) = {
            let store = self.store.read().await;
            (store.roots().len(), store.variant_count())
        };
        let flags = self.flags.lock().await;
        SessionSummary {
            roots,
            variants,
            rated: flags.rated_count(),
            saved: flags.saved_count(),
        }
    }

    /// The shared store, for callers that render it themselves.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    // ---- polling ----

    pub async fn poll_state(&self) -> PollState {
        self.poller.state().await
    }

    /// Stop the active poll, if any.
    pub async fn cancel(&self) -> bool {
        self.poller.cancel().await
    }

    pub async fn shutdown(&self) {
        self.poller.shutdown().await;
    }

    async fn require_image(&self, image_id: &str) -> Result<GeneratedImage, SessionError> {
        self.find(image_id)
            .await
            .ok_or_else(|| SessionError::ImageNotFound(image_id.to_string()))
    }
}
