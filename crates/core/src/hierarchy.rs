//! In-memory generation hierarchy: root designs and their variants.
//!
//! [`HierarchyStore`] holds the initial ("root") results of a session and
//! a mapping from any image id to the ordered list of variants derived
//! from it. Variants can themselves be refined, so the structure is a
//! forest of arbitrary depth.
//!
//! The store is mutated only through [`HierarchyStore::merge`]. Lists only
//! ever grow: a parent may gain children over several generation rounds,
//! and replaying the same job result is a no-op.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::image::GeneratedImage;
use crate::types::ImageId;

/// Outcome counts of a single [`HierarchyStore::merge`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Images appended to the store.
    pub added: usize,
    /// Images skipped because their id was already present.
    pub skipped: usize,
}

/// A node in the recursive view returned by [`HierarchyStore::snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignNode {
    pub image: GeneratedImage,
    pub children: Vec<DesignNode>,
}

/// Root results plus the parent → variants mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchyStore {
    roots: Vec<GeneratedImage>,
    variants_by_parent: HashMap<ImageId, Vec<GeneratedImage>>,
}

impl HierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a resolved job's images into the store.
    ///
    /// - Every image without a `job_id` is stamped with `job_id`.
    /// - Without `parent_id`, images are appended to the roots unless an
    ///   image with the same id is already a root.
    /// - With `parent_id`, images are appended to that parent's variants
    ///   (list created on demand) unless the parent already has a variant
    ///   with the same id. The image's own `parent_id` is filled in when
    ///   absent.
    ///
    /// Variants are keyed under their declared parent even if that parent
    /// is not (yet) in the store.
    pub fn merge(
        &mut self,
        job_id: &str,
        images: Vec<GeneratedImage>,
        parent_id: Option<&str>,
    ) -> MergeReport {
        let mut report = MergeReport::default();

        match parent_id {
            None => {
                for mut image in images {
                    if self.roots.iter().any(|existing| existing.id == image.id) {
                        report.skipped += 1;
                        continue;
                    }
                    image.job_id.get_or_insert_with(|| job_id.to_string());
                    self.roots.push(image);
                    report.added += 1;
                }
            }
            Some(parent) => {
                if !self.is_known(parent) {
                    tracing::warn!(
                        parent_id = parent,
                        job_id,
                        "Merging variants under a parent that is not in the store",
                    );
                }
                let variants = self.variants_by_parent.entry(parent.to_string()).or_default();
                for mut image in images {
                    if variants.iter().any(|existing| existing.id == image.id) {
                        report.skipped += 1;
                        continue;
                    }
                    image.job_id.get_or_insert_with(|| job_id.to_string());
                    image.parent_id.get_or_insert_with(|| parent.to_string());
                    variants.push(image);
                    report.added += 1;
                }
            }
        }

        tracing::debug!(
            job_id,
            parent_id,
            added = report.added,
            skipped = report.skipped,
            "Merged job result into hierarchy",
        );
        report
    }

    /// Depth-first search from the roots, following variant edges to any
    /// depth. Returns the first image with `image_id`.
    pub fn find(&self, image_id: &str) -> Option<&GeneratedImage> {
        let mut stack: Vec<&GeneratedImage> = self.roots.iter().rev().collect();
        let mut visited: HashSet<&str> = HashSet::new();

        while let Some(image) = stack.pop() {
            if !visited.insert(image.id.as_str()) {
                continue;
            }
            if image.id == image_id {
                return Some(image);
            }
            if let Some(children) = self.variants_by_parent.get(&image.id) {
                stack.extend(children.iter().rev());
            }
        }
        None
    }

    /// The hierarchy as a recursive tree, in depth-first insertion order.
    ///
    /// Variants filed under parents that are not reachable from a root
    /// are not part of the snapshot.
    pub fn snapshot(&self) -> Vec<DesignNode> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut nodes = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            if let Some(node) = self.build_node(root, &mut visited) {
                nodes.push(node);
            }
        }
        nodes
    }

    pub fn roots(&self) -> &[GeneratedImage] {
        &self.roots
    }

    /// Variants derived directly from `parent_id`, in arrival order.
    pub fn variants_of(&self, parent_id: &str) -> &[GeneratedImage] {
        self.variants_by_parent
            .get(parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of variants across all parents.
    pub fn variant_count(&self) -> usize {
        self.variants_by_parent.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.variant_count() == 0
    }

    /// `true` if `image_id` is a root or appears in any variant list,
    /// reachable or not.
    pub fn is_known(&self, image_id: &str) -> bool {
        self.roots.iter().any(|image| image.id == image_id)
            || self
                .variants_by_parent
                .values()
                .flatten()
                .any(|image| image.id == image_id)
    }

    // ---- private helpers ----

    fn build_node<'a>(
        &'a self,
        image: &'a GeneratedImage,
        visited: &mut HashSet<&'a str>,
    ) -> Option<DesignNode> {
        if !visited.insert(image.id.as_str()) {
            return None;
        }
        let children = self
            .variants_of(&image.id)
            .iter()
            .filter_map(|child| self.build_node(child, visited))
            .collect();
        Some(DesignNode {
            image: image.clone(),
            children,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
