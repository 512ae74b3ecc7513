//! Text and JSON renderings of a session's hierarchy.

use std::fmt::Write;

use serde::Serialize;

use designflow_core::hierarchy::DesignNode;
use designflow_core::layout::Layout;

use crate::session::SessionSummary;

const INDENT: &str = "  ";

/// Render the hierarchy as an indented tree, one image per line:
///
/// ```text
/// I1 [J1] u1
///   I2 [J2] u2
/// ```
pub fn render_tree(nodes: &[DesignNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(&mut out, node, 0);
    }
    out
}

fn render_node(out: &mut String, node: &DesignNode, depth: usize) {
    let image = &node.image;
    let _ = write!(out, "{}{}", INDENT.repeat(depth), image.id);
    if let Some(job_id) = &image.job_id {
        let _ = write!(out, " [{job_id}]");
    }
    if !image.url.is_empty() {
        let _ = write!(out, " {}", image.url);
    }
    out.push('\n');

    for child in &node.children {
        render_node(out, child, depth + 1);
    }
}

#[derive(Serialize)]
struct Report<'a> {
    summary: SessionSummary,
    layout: &'a Layout,
}

/// Pretty-printed JSON with the session summary and the positioned graph.
pub fn render_layout_json(summary: SessionSummary, layout: &Layout) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Report { summary, layout })
}

#[cfg(test)]
mod tests {
    use designflow_core::hierarchy::HierarchyStore;
    use designflow_core::image::GeneratedImage;
    use designflow_core::layout::{layout_hierarchy, LayoutConfig};

    use super::*;

    fn store() -> HierarchyStore {
        let mut store = HierarchyStore::new();
        store.merge(
            "J1",
            vec![GeneratedImage::new("I1", "u1"), GeneratedImage::new("I4", "")],
            None,
        );
        store.merge("J2", vec![GeneratedImage::new("I2", "u2")], Some("I1"));
        store.merge("J3", vec![GeneratedImage::new("I3", "u3")], Some("I2"));
        store
    }

    #[test]
    fn tree_is_indented_by_depth() {
        let rendered = render_tree(&store().snapshot());
        assert_eq!(
            rendered,
            "I1 [J1] u1\n  I2 [J2] u2\n    I3 [J3] u3\nI4 [J1]\n"
        );
    }

    #[test]
    fn empty_hierarchy_renders_nothing() {
        assert_eq!(render_tree(&[]), "");
    }

    #[test]
    fn layout_json_carries_nodes_edges_and_summary() {
        let layout = layout_hierarchy(&store(), &LayoutConfig::default());
        let summary = SessionSummary {
            roots: 2,
            variants: 2,
            ..SessionSummary::default()
        };

        let json: serde_json::Value =
            serde_json::from_str(&render_layout_json(summary, &layout).unwrap()).unwrap();

        assert_eq!(json["summary"]["roots"], 2);
        assert_eq!(json["layout"]["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(json["layout"]["edges"][0]["source"], "I1");
        assert_eq!(json["layout"]["edges"][0]["target"], "I2");
        assert_eq!(json["layout"]["nodes"][1]["x"], 320.0);
    }
}
