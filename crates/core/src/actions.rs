//! Optimistic per-image action flags (rated, saved).
//!
//! The session flips a flag as soon as the user acts, before the backend
//! call resolves, and rolls it back if the call fails. Flags are kept
//! apart from the [`HierarchyStore`](crate::hierarchy::HierarchyStore),
//! which only `merge` may mutate.

use std::collections::{BTreeSet, HashMap};

use crate::error::CoreError;
use crate::image::Rating;
use crate::types::ImageId;

#[derive(Debug, Clone, Default)]
pub struct ActionFlags {
    ratings: HashMap<ImageId, Rating>,
    saved: BTreeSet<ImageId>,
}

impl ActionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rating. Each image can be rated once.
    pub fn mark_rated(&mut self, image_id: &str, rating: Rating) -> Result<(), CoreError> {
        if let Some(existing) = self.ratings.get(image_id) {
            return Err(CoreError::Conflict(format!(
                "Image {image_id} already rated '{}'",
                existing.as_str()
            )));
        }
        self.ratings.insert(image_id.to_string(), rating);
        Ok(())
    }

    /// Undo [`mark_rated`](Self::mark_rated) after a failed submission.
    pub fn rollback_rating(&mut self, image_id: &str) {
        self.ratings.remove(image_id);
    }

    pub fn rating(&self, image_id: &str) -> Option<Rating> {
        self.ratings.get(image_id).copied()
    }

    /// Mark an image saved. Saving twice is a conflict.
    pub fn mark_saved(&mut self, image_id: &str) -> Result<(), CoreError> {
        if !self.saved.insert(image_id.to_string()) {
            return Err(CoreError::Conflict(format!("Image {image_id} already saved")));
        }
        Ok(())
    }

    pub fn rollback_saved(&mut self, image_id: &str) {
        self.saved.remove(image_id);
    }

    pub fn is_saved(&self, image_id: &str) -> bool {
        self.saved.contains(image_id)
    }

    pub fn rated_count(&self) -> usize {
        self.ratings.len()
    }

    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }
}
