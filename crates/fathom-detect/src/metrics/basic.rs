//! Static graph metrics: degree, connected components, and density.
//!
//! These are cheap, linear-time summaries computed on every run and
//! reported alongside the findings so a reader can judge how much
//! structure the corpus actually had.

use std::collections::BTreeMap;

use petgraph::visit::IntoNodeIdentifiers;
use serde::Serialize;

use crate::graph::CooccurrenceGraph;

// ---------------------------------------------------------------------------
// Degree
// ---------------------------------------------------------------------------

/// Distinct-neighbor count per canonical name.
#[must_use]
pub fn degree_map(g: &CooccurrenceGraph) -> BTreeMap<String, usize> {
    g.entities().map(|name| (name.to_string(), g.degree(name))).collect()
}

// ---------------------------------------------------------------------------
// Connected components
// ---------------------------------------------------------------------------

/// Information about connected components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentInfo {
    /// Number of connected components.
    pub count: usize,
    /// Size of each component, sorted descending.
    pub sizes: Vec<usize>,
}

/// Find connected components with an iterative DFS.
#[must_use]
pub fn component_info(g: &CooccurrenceGraph) -> ComponentInfo {
    let graph = &g.graph;
    let node_count = graph.node_count();
    if node_count == 0 {
        return ComponentInfo {
            count: 0,
            sizes: vec![],
        };
    }

    let mut visited = vec![false; node_count];
    let mut sizes = Vec::new();

    for start in graph.node_identifiers() {
        if visited[start.index()] {
            continue;
        }

        let mut stack = vec![start];
        let mut component_size = 0usize;

        while let Some(node) = stack.pop() {
            if visited[node.index()] {
                continue;
            }
            visited[node.index()] = true;
            component_size += 1;

            for neighbor in graph.neighbors(node) {
                if !visited[neighbor.index()] {
                    stack.push(neighbor);
                }
            }
        }

        sizes.push(component_size);
    }

    sizes.sort_unstable_by(|a, b| b.cmp(a));

    ComponentInfo {
        count: sizes.len(),
        sizes,
    }
}

// ---------------------------------------------------------------------------
// Density
// ---------------------------------------------------------------------------

/// Undirected density `2E / (N (N - 1))`; 0.0 below two nodes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn density(g: &CooccurrenceGraph) -> f64 {
    let n = g.node_count();
    if n < 2 {
        return 0.0;
    }
    let e = g.edge_count() as f64;
    let n = n as f64;
    2.0 * e / (n * (n - 1.0))
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Graph summary carried in the run report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub total_weight: usize,
    pub density: f64,
    pub components: ComponentInfo,
    pub documents_used: usize,
    pub documents_skipped: usize,
    pub content_hash: String,
}

impl GraphStats {
    #[must_use]
    pub fn of(g: &CooccurrenceGraph) -> Self {
        Self {
            nodes: g.node_count(),
            edges: g.edge_count(),
            total_weight: g.total_weight(),
            density: density(g),
            components: component_info(g),
            documents_used: g.documents_used(),
            documents_skipped: g.documents_skipped(),
            content_hash: g.content_hash.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_core::config::GraphConfig;
    use fathom_core::model::{Citation, DocumentEntities};

    fn graph(docs: &[(&str, &[&str])]) -> CooccurrenceGraph {
        let docs: Vec<DocumentEntities> = docs
            .iter()
            .map(|(id, names)| {
                DocumentEntities::new(
                    Citation::new(*id, "h", format!("{id}.pdf"), 1),
                    names.iter().map(|s| (*s).to_string()).collect(),
                )
            })
            .collect();
        CooccurrenceGraph::build(&docs, &GraphConfig::default())
    }

    #[test]
    fn component_info_empty() {
        let ci = component_info(&graph(&[]));
        assert_eq!(ci.count, 0);
        assert!(ci.sizes.is_empty());
    }

    #[test]
    fn component_info_disjoint() {
        let ci = component_info(&graph(&[("d1", &["a", "b", "c"]), ("d2", &["x", "y"])]));
        assert_eq!(ci.count, 2);
        assert_eq!(ci.sizes, vec![3, 2]);
    }

    #[test]
    fn density_of_triangle_is_one() {
        let g = graph(&[("d1", &["a", "b", "c"])]);
        assert!((density(&g) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn density_of_path() {
        // a-b, b-c: 2 edges of a possible 3
        let g = graph(&[("d1", &["a", "b"]), ("d2", &["b", "c"])]);
        assert!((density(&g) - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn degree_map_covers_every_node() {
        let g = graph(&[("d1", &["a", "b"]), ("d2", &["b", "c"])]);
        let d = degree_map(&g);
        assert_eq!(d.len(), 3);
        assert_eq!(d["b"], 2);
        assert_eq!(d["a"], 1);
    }

    #[test]
    fn stats_summarize_graph() {
        let g = graph(&[("d1", &["a", "b"]), ("d2", &["a", "b"]), ("d3", &["solo"])]);
        let s = GraphStats::of(&g);
        assert_eq!(s.nodes, 2);
        assert_eq!(s.edges, 1);
        assert_eq!(s.total_weight, 2);
        assert_eq!(s.documents_used, 2);
        assert_eq!(s.documents_skipped, 1);
        assert_eq!(s.content_hash, g.content_hash);
    }
}
