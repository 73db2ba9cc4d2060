//! Betweenness centrality via Brandes' algorithm.
//!
//! # Overview
//!
//! Betweenness centrality measures how often a node lies on shortest paths
//! between other pairs of nodes. In a co-occurrence graph, high-betweenness
//! entities connect clusters that otherwise rarely share a document.
//!
//! # Algorithm
//!
//! Brandes (2001) for unweighted graphs, with hop count as distance:
//!
//! 1. For each source node `s`, run BFS to compute shortest-path counts
//!    and distances.
//! 2. Accumulate dependency scores in reverse BFS order (farthest nodes first).
//! 3. Sum the dependency scores across all source nodes.
//!
//! Sources are processed in fixed-size chunks on the rayon pool; chunk sums
//! are added in chunk order so the floating-point result does not depend on
//! thread scheduling.
//!
//! Complexity: O(V * E) time, O(V + E) space per worker.
//!
//! # Normalization
//!
//! The graph is undirected, so every unordered pair is visited from both
//! ends. Dividing the raw sum by `(n-1)(n-2)` therefore equals dividing the
//! pair count by `(n-1)(n-2)/2`, giving scores in `[0, 1]`.
//!
//! # Sampling
//!
//! Above `exact_node_limit` nodes only `sample_pivots` sources, drawn by a
//! seeded RNG, are expanded and the sum is scaled by `n / pivots`. The same
//! seed always picks the same pivots.

use std::collections::{BTreeMap, VecDeque};

use fathom_core::config::BridgeConfig;
use fathom_core::error::ErrorCode;
use petgraph::graph::{NodeIndex, UnGraph};
use rand::{SeedableRng, rngs::StdRng, seq::index};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::CooccurrenceGraph;

const SOURCE_CHUNK: usize = 64;

/// Centrality computation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CentralityError {
    /// Path counts overflowed or a division went wrong.
    #[error("betweenness for {entity} is not finite ({value})")]
    NonFinite { entity: String, value: f64 },
}

impl CentralityError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::CentralityFailure
    }
}

/// How the scores were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CentralityMethod {
    Exact,
    Sampled { pivots: usize, seed: u64 },
}

impl CentralityMethod {
    #[must_use]
    pub const fn is_sampled(self) -> bool {
        matches!(self, Self::Sampled { .. })
    }
}

/// Normalized betweenness for every node.
#[derive(Debug, Clone, PartialEq)]
pub struct Centrality {
    pub scores: BTreeMap<String, f64>,
    pub method: CentralityMethod,
}

impl Centrality {
    /// Score for a canonical name; 0.0 when absent.
    #[must_use]
    pub fn score(&self, name: &str) -> f64 {
        self.scores.get(name).copied().unwrap_or(0.0)
    }
}

/// Compute normalized betweenness centrality for all nodes.
///
/// Isolated graphs, and graphs with two or fewer nodes, score 0.0 everywhere.
///
/// # Errors
///
/// [`CentralityError::NonFinite`] if any score is NaN or infinite.
#[instrument(skip_all, fields(nodes = g.node_count(), edges = g.edge_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn betweenness_centrality(
    g: &CooccurrenceGraph,
    config: &BridgeConfig,
) -> Result<Centrality, CentralityError> {
    let graph = &g.graph;
    let n = graph.node_count();

    let (sources, method) = choose_sources(n, config);
    debug!(sources = sources.len(), ?method, "running brandes");

    let partials: Vec<Vec<f64>> = sources
        .par_chunks(SOURCE_CHUNK)
        .map(|chunk| {
            let mut cb = vec![0.0; n];
            for &s in chunk {
                accumulate_source(graph, NodeIndex::new(s), &mut cb);
            }
            cb
        })
        .collect();

    let mut cb = vec![0.0; n];
    for partial in &partials {
        for (acc, v) in cb.iter_mut().zip(partial) {
            *acc += v;
        }
    }

    let scale = match method {
        CentralityMethod::Exact => 1.0,
        CentralityMethod::Sampled { pivots, .. } => n as f64 / pivots as f64,
    };
    let norm = if n > 2 {
        ((n - 1) * (n - 2)) as f64
    } else {
        0.0
    };

    let mut scores = BTreeMap::new();
    for idx in graph.node_indices() {
        let raw = cb[idx.index()] * scale;
        let score = if norm > 0.0 { raw / norm } else { 0.0 };
        let entity = graph[idx].clone();
        if !score.is_finite() {
            return Err(CentralityError::NonFinite {
                entity,
                value: score,
            });
        }
        // Sampled estimates can overshoot slightly.
        scores.insert(entity, score.clamp(0.0, 1.0));
    }

    Ok(Centrality { scores, method })
}

fn choose_sources(n: usize, config: &BridgeConfig) -> (Vec<usize>, CentralityMethod) {
    if n <= config.exact_node_limit || config.sample_pivots >= n {
        return ((0..n).collect(), CentralityMethod::Exact);
    }
    let mut rng = StdRng::seed_from_u64(config.sample_seed);
    let mut pivots = index::sample(&mut rng, n, config.sample_pivots).into_vec();
    pivots.sort_unstable();
    let method = CentralityMethod::Sampled {
        pivots: pivots.len(),
        seed: config.sample_seed,
    };
    (pivots, method)
}

/// Single-source Brandes pass; adds the dependencies of `s` into `cb`.
fn accumulate_source(g: &UnGraph<String, usize>, s: NodeIndex, cb: &mut [f64]) {
    let n = g.node_count();
    let si = s.index();

    // Stack: nodes in order of discovery (farthest popped first).
    let mut stack: Vec<NodeIndex> = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];

    // sigma[t]: number of shortest paths from s to t.
    let mut sigma: Vec<f64> = vec![0.0; n];
    sigma[si] = 1.0;

    // dist[t]: hop distance from s to t (-1 = unvisited).
    let mut dist: Vec<i64> = vec![-1; n];
    dist[si] = 0;

    let mut queue: VecDeque<NodeIndex> = VecDeque::new();
    queue.push_back(s);

    while let Some(v) = queue.pop_front() {
        let vi = v.index();
        stack.push(v);

        for w in g.neighbors(v) {
            let wi = w.index();

            if dist[wi] < 0 {
                dist[wi] = dist[vi] + 1;
                queue.push_back(w);
            }

            if dist[wi] == dist[vi] + 1 {
                sigma[wi] += sigma[vi];
                predecessors[wi].push(v);
            }
        }
    }

    let mut delta: Vec<f64> = vec![0.0; n];

    while let Some(w) = stack.pop() {
        let wi = w.index();

        for &v in &predecessors[wi] {
            let vi = v.index();
            if sigma[wi] > 0.0 {
                delta[vi] += (sigma[vi] / sigma[wi]) * (1.0 + delta[wi]);
            }
        }

        if wi != si {
            cb[wi] += delta[wi];
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
