//! Bridge-entity detection.
//!
//! A bridge is an entity that sits on many shortest paths between other
//! entities while having few direct connections of its own: high
//! betweenness, low degree. Hubs that co-occur with everyone are excluded
//! by the degree cap.

use std::cmp::Ordering;

use fathom_core::config::BridgeConfig;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::CooccurrenceGraph;
use crate::metrics::betweenness::{CentralityError, CentralityMethod, betweenness_centrality};

/// One ranked entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeCandidate {
    pub entity: String,
    pub centrality: f64,
    pub degree: usize,
}

impl BridgeCandidate {
    /// `centrality >= min_centrality && degree <= max_degree`.
    #[must_use]
    pub fn is_bridge(&self, config: &BridgeConfig) -> bool {
        self.centrality >= config.min_centrality && self.degree <= config.max_degree
    }
}

/// Ranking: centrality descending, degree ascending, name ascending.
fn rank_order(a: &BridgeCandidate, b: &BridgeCandidate) -> Ordering {
    b.centrality
        .total_cmp(&a.centrality)
        .then(a.degree.cmp(&b.degree))
        .then_with(|| a.entity.cmp(&b.entity))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeReport {
    /// Every node, ranked.
    pub ranked: Vec<BridgeCandidate>,
    /// Ranked nodes passing both thresholds, capped at `max_results`.
    pub bridges: Vec<BridgeCandidate>,
    pub method: CentralityMethod,
}

/// Score and rank every node, then select bridges.
///
/// A graph without edges yields no bridges.
///
/// # Errors
///
/// Propagates [`CentralityError`] when a score is not finite.
#[instrument(skip_all, fields(nodes = g.node_count()))]
pub fn detect_bridges(
    g: &CooccurrenceGraph,
    config: &BridgeConfig,
) -> Result<BridgeReport, CentralityError> {
    let centrality = betweenness_centrality(g, config)?;

    let mut ranked: Vec<BridgeCandidate> = centrality
        .scores
        .iter()
        .map(|(entity, &score)| BridgeCandidate {
            entity: entity.clone(),
            centrality: score,
            degree: g.degree(entity),
        })
        .collect();
    ranked.sort_by(rank_order);

    let limit = config.max_results.unwrap_or(usize::MAX);
    let bridges: Vec<BridgeCandidate> = ranked
        .iter()
        .filter(|c| c.is_bridge(config))
        .take(limit)
        .cloned()
        .collect();

    debug!(
        ranked = ranked.len(),
        bridges = bridges.len(),
        method = ?centrality.method,
        "bridge ranking complete"
    );

    Ok(BridgeReport {
        ranked,
        bridges,
        method: centrality.method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_core::config::GraphConfig;
    use fathom_core::model::{Citation, DocumentEntities};

    fn graph(docs: &[&[&str]]) -> CooccurrenceGraph {
        let docs: Vec<DocumentEntities> = docs
            .iter()
            .enumerate()
            .map(|(i, names)| {
                let id = format!("d{i}");
                DocumentEntities::new(
                    Citation::new(id.clone(), "h", format!("{id}.pdf"), 1),
                    names.iter().map(|s| (*s).to_string()).collect(),
                )
            })
            .collect();
        CooccurrenceGraph::build(&docs, &GraphConfig::default())
    }

    #[test]
    fn no_edges_no_bridges() {
        let report = detect_bridges(&graph(&[&["alone"]]), &BridgeConfig::default()).expect("detect");
        assert!(report.ranked.is_empty());
        assert!(report.bridges.is_empty());
    }

    #[test]
    fn path_midpoint_is_a_bridge() {
        let report = detect_bridges(&graph(&[&["a", "b"], &["b", "c"]]), &BridgeConfig::default())
            .expect("detect");
        assert_eq!(report.bridges.len(), 1);
        assert_eq!(report.bridges[0].entity, "b");
        assert_eq!(report.bridges[0].degree, 2);
    }

    #[test]
    fn hubs_over_the_degree_cap_are_excluded() {
        let cfg = BridgeConfig {
            max_degree: 2,
            ..BridgeConfig::default()
        };
        let report = detect_bridges(
            &graph(&[&["hub", "a"], &["hub", "b"], &["hub", "c"]]),
            &cfg,
        )
        .expect("detect");
        assert_eq!(report.ranked[0].entity, "hub");
        assert!(report.bridges.is_empty());
    }

    #[test]
    fn ties_break_on_degree_then_name() {
        let mk = |entity: &str, centrality: f64, degree: usize| BridgeCandidate {
            entity: entity.into(),
            centrality,
            degree,
        };
        let mut v = vec![mk("b", 0.5, 2), mk("a", 0.5, 2), mk("c", 0.5, 1), mk("d", 0.9, 4)];
        v.sort_by(rank_order);
        let names: Vec<&str> = v.iter().map(|c| c.entity.as_str()).collect();
        assert_eq!(names, vec!["d", "c", "a", "b"]);
    }

    #[test]
    fn max_results_caps_bridges_but_not_ranking() {
        let cfg = BridgeConfig {
            max_results: Some(1),
            ..BridgeConfig::default()
        };
        // a - b - c - d: b and c both qualify.
        let report =
            detect_bridges(&graph(&[&["a", "b"], &["b", "c"], &["c", "d"]]), &cfg).expect("detect");
        assert_eq!(report.bridges.len(), 1);
        assert_eq!(report.bridges[0].entity, "b");
        assert_eq!(report.ranked.len(), 4);
    }
}
