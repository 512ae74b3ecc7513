//! Hierarchy-to-layout transformer.
//!
//! Turns a [`HierarchyStore`] into positioned nodes and parent → child
//! edges for a left-to-right tree (or forest) view.
//!
//! Placement is depth-first:
//!
//! - `x = depth * node_spacing_x`.
//! - Each depth keeps a high-water mark: the next free `y` at that depth.
//!   A node is placed at the slot its parent asked for, or at the mark if
//!   that slot is already taken, and the mark then moves one slot below.
//! - A parent centers its block of children around its own `y`. If the
//!   block would start above the free space at the child depth, it is
//!   pushed down to the first free slot.
//! - After each root subtree, the root cursor moves past the lowest node
//!   in that subtree.
//!
//! The output depends only on the store's insertion order.

use std::collections::HashSet;

use serde::Serialize;

use crate::hierarchy::HierarchyStore;
use crate::image::GeneratedImage;
use crate::types::ImageId;

/// Default horizontal distance between depth columns.
pub const DEFAULT_NODE_SPACING_X: f64 = 320.0;
/// Default vertical distance between sibling slots.
pub const DEFAULT_NODE_SPACING_Y: f64 = 260.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub node_spacing_x: f64,
    pub node_spacing_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing_x: DEFAULT_NODE_SPACING_X,
            node_spacing_y: DEFAULT_NODE_SPACING_Y,
        }
    }
}

/// Position of one image in the laid-out graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePlacement {
    pub image_id: ImageId,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
}

/// A parent → child relation between two placed images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEdge {
    pub source: ImageId,
    pub target: ImageId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    /// Placements in depth-first order.
    pub nodes: Vec<NodePlacement>,
    pub edges: Vec<LayoutEdge>,
}

impl Layout {
    pub fn position(&self, image_id: &str) -> Option<(f64, f64)> {
        self.nodes
            .iter()
            .find(|node| node.image_id == image_id)
            .map(|node| (node.x, node.y))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Lay out every image reachable from the store's roots.
pub fn layout_hierarchy(store: &HierarchyStore, config: &LayoutConfig) -> Layout {
    let mut placer = Placer {
        store,
        config,
        high_water: Vec::new(),
        visited: HashSet::new(),
        layout: Layout::default(),
    };

    let mut cursor = 0.0;
    for root in store.roots() {
        if placer.visited.contains(root.id.as_str()) {
            continue;
        }
        let lowest = placer.place(root, 0, cursor);
        cursor = lowest + config.node_spacing_y;
    }

    placer.layout
}

struct Placer<'a> {
    store: &'a HierarchyStore,
    config: &'a LayoutConfig,
    /// Next free `y` per depth; `None` until something is placed there.
    high_water: Vec<Option<f64>>,
    visited: HashSet<&'a str>,
    layout: Layout,
}

impl<'a> Placer<'a> {
    /// Place `image` and its subtree. Returns the lowest `y` used.
    fn place(&mut self, image: &'a GeneratedImage, depth: usize, requested_y: f64) -> f64 {
        self.visited.insert(image.id.as_str());

        let y = self.claim_slot(depth, requested_y);
        self.layout.nodes.push(NodePlacement {
            image_id: image.id.clone(),
            depth,
            x: depth as f64 * self.config.node_spacing_x,
            y,
        });

        let store = self.store;
        let children = store.variants_of(&image.id);
        if children.is_empty() {
            return y;
        }

        let spacing = self.config.node_spacing_y;
        let block_height = children.len() as f64 * spacing;
        let mut start = y - (block_height - spacing) / 2.0;
        if let Some(free) = self.next_free(depth + 1) {
            if start < free {
                start = free;
            }
        }

        let mut lowest = y;
        let mut slot = 0usize;
        for child in children {
            // Cycles or an id listed under two parents: place it once.
            if self.visited.contains(child.id.as_str()) {
                continue;
            }
            self.layout.edges.push(LayoutEdge {
                source: image.id.clone(),
                target: child.id.clone(),
            });
            let child_lowest = self.place(child, depth + 1, start + slot as f64 * spacing);
            lowest = lowest.max(child_lowest);
            slot += 1;
        }
        lowest
    }

    fn next_free(&self, depth: usize) -> Option<f64> {
        self.high_water.get(depth).copied().flatten()
    }

    fn claim_slot(&mut self, depth: usize, requested_y: f64) -> f64 {
        let y = match self.next_free(depth) {
            Some(free) if free > requested_y => free,
            _ => requested_y,
        };
        if self.high_water.len() <= depth {
            self.high_water.resize(depth + 1, None);
        }
        self.high_water[depth] = Some(y + self.config.node_spacing_y);
        y
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
