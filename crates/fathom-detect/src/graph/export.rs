//! Serializable snapshot of the co-occurrence graph.
//!
//! Nodes and edges come out in canonical-name order, so two runs over the
//! same facts export byte-identical JSON.

use serde::Serialize;

use super::CooccurrenceGraph;
use crate::metrics::basic::degree_map;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeExport {
    pub entity: String,
    pub degree: usize,
    /// Distinct documents in which the entity co-occurs with another.
    pub document_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeExport {
    pub a: String,
    pub b: String,
    pub weight: usize,
    pub documents: Vec<String>,
}

/// Node and edge lists of a frozen graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
}

impl GraphExport {
    #[must_use]
    pub fn of(g: &CooccurrenceGraph) -> Self {
        let nodes = degree_map(g)
            .into_iter()
            .map(|(entity, degree)| NodeExport {
                document_count: g.entity_documents(&entity).len(),
                entity,
                degree,
            })
            .collect();
        let edges = g
            .edges()
            .map(|(a, b, evidence)| EdgeExport {
                a: a.to_string(),
                b: b.to_string(),
                weight: evidence.weight(),
                documents: evidence.documents.iter().cloned().collect(),
            })
            .collect();
        Self { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_core::config::GraphConfig;
    use fathom_core::model::{Citation, DocumentEntities};

    fn doc(id: &str, names: &[&str]) -> DocumentEntities {
        DocumentEntities::new(
            Citation::new(id, "h", format!("{id}.pdf"), 1),
            names.iter().map(|s| (*s).to_string()).collect(),
        )
    }

    #[test]
    fn export_lists_nodes_and_edges_in_order() {
        let g = CooccurrenceGraph::build(
            &[doc("d2", &["b", "a"]), doc("d1", &["a", "b"]), doc("d3", &["b", "c"])],
            &GraphConfig::default(),
        );
        let export = GraphExport::of(&g);

        let names: Vec<&str> = export.nodes.iter().map(|n| n.entity.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(export.nodes[1].degree, 2);
        assert_eq!(export.nodes[1].document_count, 3);

        assert_eq!(
            export.edges[0],
            EdgeExport {
                a: "a".into(),
                b: "b".into(),
                weight: 2,
                documents: vec!["d1".into(), "d2".into()],
            }
        );
        assert_eq!(export.edges.len(), 2);
    }

    #[test]
    fn empty_graph_exports_nothing() {
        let g = CooccurrenceGraph::build(&[], &GraphConfig::default());
        assert_eq!(GraphExport::of(&g), GraphExport::default());
    }
}
