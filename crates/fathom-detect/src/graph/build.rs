//! Co-occurrence graph construction.
//!
//! # Overview
//!
//! Every document contributes its set of canonical entity names. Each
//! unordered pair of distinct names in that set gains the document as
//! evidence, so the weight of edge `{a, b}` is the number of distinct
//! documents in which both appear.
//!
//! ## Partial graphs
//!
//! A [`PartialGraph`] accumulates evidence for a slice of documents. Edge
//! and entity evidence are sets of document ids and citations, and the
//! document counters are id sets too, so [`PartialGraph::merge`] is a set
//! union, commutative and associative. That lets the parallel
//! build split documents into chunks and reduce the chunk graphs in any
//! order without changing a single weight.
//!
//! ## Freezing
//!
//! [`CooccurrenceGraph`] is the frozen form: an adjacency mapping keyed by
//! canonical name plus an index-based `petgraph` graph for the centrality
//! pass. Nodes are inserted in canonical-name order, so insertion order of
//! the input documents never leaks into node indices.
//!
//! ## Content hash
//!
//! The frozen graph carries a BLAKE3 hash of the sorted `(a, b, weight)`
//! edge list. Two builds over the same documents, in any order, produce
//! the same hash.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use fathom_core::config::GraphConfig;
use fathom_core::model::{Citation, DocumentEntities, EntityMention, canonicalize_entity, group_mentions};
use petgraph::graph::{NodeIndex, UnGraph};
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

/// Canonical names of an edge's endpoints, lexicographically ordered.
pub type EdgeKey = (String, String);

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// Documents and page citations backing one edge or one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    pub documents: BTreeSet<String>,
    pub citations: BTreeSet<Citation>,
}

impl Evidence {
    /// Number of distinct documents.
    #[must_use]
    pub fn weight(&self) -> usize {
        self.documents.len()
    }

    fn absorb(&mut self, other: Self) {
        self.documents.extend(other.documents);
        self.citations.extend(other.citations);
    }
}

// ---------------------------------------------------------------------------
// PartialGraph
// ---------------------------------------------------------------------------

/// Edge and entity evidence accumulated over some subset of the corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialGraph {
    edges: BTreeMap<EdgeKey, Evidence>,
    entities: BTreeMap<String, Evidence>,
    /// Ids of documents that contributed at least one pair.
    used: BTreeSet<String>,
    /// Ids of documents with fewer than two distinct entities.
    skipped: BTreeSet<String>,
}

impl PartialGraph {
    /// Add one document's entity set.
    ///
    /// Names are canonicalized and deduplicated first. Sets with fewer than
    /// two distinct names contribute nothing. An edge is cited with the
    /// pages of its two endpoints only.
    pub fn add_document(&mut self, doc: &DocumentEntities, max_entities: usize) {
        let mut names: BTreeMap<String, BTreeSet<&Citation>> = BTreeMap::new();
        for (raw, citations) in &doc.entities {
            if let Some(name) = canonicalize_entity(raw) {
                names.entry(name).or_default().extend(citations);
            }
        }

        if names.len() < 2 {
            self.skipped.insert(doc.document_id.clone());
            return;
        }
        if names.len() > max_entities {
            warn!(
                document_id = %doc.document_id,
                entities = names.len(),
                limit = max_entities,
                "document has an unusually large entity set; pair count is quadratic"
            );
        }

        for (name, citations) in &names {
            let evidence = self.entities.entry(name.clone()).or_default();
            evidence.documents.insert(doc.document_id.clone());
            evidence.citations.extend(citations.iter().copied().cloned());
        }

        let keys: Vec<&String> = names.keys().collect();
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                // BTreeMap iteration is sorted, so (a, b) is already canonical.
                let evidence = self.edges.entry(((*a).clone(), (*b).clone())).or_default();
                evidence.documents.insert(doc.document_id.clone());
                evidence
                    .citations
                    .extend(names[*a].iter().chain(&names[*b]).copied().cloned());
            }
        }
        self.used.insert(doc.document_id.clone());
    }

    /// Sequentially accumulate a slice of documents.
    #[must_use]
    pub fn from_documents(docs: &[DocumentEntities], max_entities: usize) -> Self {
        let mut partial = Self::default();
        for doc in docs {
            partial.add_document(doc, max_entities);
        }
        partial
    }

    /// Union two partial graphs.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (key, evidence) in other.edges {
            self.edges.entry(key).or_default().absorb(evidence);
        }
        for (name, evidence) in other.entities {
            self.entities.entry(name).or_default().absorb(evidence);
        }
        self.used.extend(other.used);
        self.skipped.extend(other.skipped);
        self
    }

    /// Edge weights only, for comparing partial graphs.
    #[must_use]
    pub fn weights(&self) -> BTreeMap<EdgeKey, usize> {
        self.edges
            .iter()
            .map(|(k, ev)| (k.clone(), ev.weight()))
            .collect()
    }

    /// Distinct document ids that contributed at least one pair.
    #[must_use]
    pub fn documents_used(&self) -> usize {
        self.used.len()
    }

    /// Distinct document ids that never contributed a pair. An id skipped
    /// in one entry but used in another counts as used.
    #[must_use]
    pub fn documents_skipped(&self) -> usize {
        self.skipped.difference(&self.used).count()
    }
}

// ---------------------------------------------------------------------------
// CooccurrenceGraph
// ---------------------------------------------------------------------------

/// Frozen, undirected, weighted co-occurrence graph.
///
/// No self-loops and no parallel edges: each unordered pair of canonical
/// names has at most one edge whose weight counts distinct documents.
#[derive(Debug, Clone)]
pub struct CooccurrenceGraph {
    /// Index-based view for traversal algorithms. Edge weights are
    /// document counts.
    pub graph: UnGraph<String, usize>,
    /// Mapping from canonical name to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// BLAKE3 hash of the sorted `(a, b, weight)` edge list.
    pub content_hash: String,
    adjacency: BTreeMap<String, BTreeMap<String, usize>>,
    edges: BTreeMap<EdgeKey, Evidence>,
    entities: BTreeMap<String, Evidence>,
    documents_used: usize,
    documents_skipped: usize,
}

impl CooccurrenceGraph {
    /// Build sequentially, in input order.
    #[must_use]
    #[instrument(skip_all, fields(documents = docs.len()))]
    pub fn build(docs: &[DocumentEntities], config: &GraphConfig) -> Self {
        Self::freeze(PartialGraph::from_documents(docs, config.max_entities_per_document))
    }

    /// Build with documents split into `partition_size` chunks on the rayon
    /// pool. The result is identical to [`CooccurrenceGraph::build`].
    #[must_use]
    #[instrument(skip_all, fields(documents = docs.len()))]
    pub fn build_parallel(docs: &[DocumentEntities], config: &GraphConfig) -> Self {
        let max_entities = config.max_entities_per_document;
        let partial = docs
            .par_chunks(config.partition_size.max(1))
            .map(|chunk| PartialGraph::from_documents(chunk, max_entities))
            .reduce(PartialGraph::default, PartialGraph::merge);
        Self::freeze(partial)
    }

    /// Group validated mentions by document and build in parallel.
    #[must_use]
    pub fn from_mentions(mentions: &[EntityMention], config: &GraphConfig) -> Self {
        Self::build_parallel(&group_mentions(mentions), config)
    }

    /// Freeze accumulated evidence into the indexed form.
    #[must_use]
    pub fn freeze(partial: PartialGraph) -> Self {
        let documents_used = partial.documents_used();
        let documents_skipped = partial.documents_skipped();
        let PartialGraph { edges, entities, .. } = partial;

        let mut adjacency: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for ((a, b), evidence) in &edges {
            let w = evidence.weight();
            adjacency.entry(a.clone()).or_default().insert(b.clone(), w);
            adjacency.entry(b.clone()).or_default().insert(a.clone(), w);
        }

        let mut graph = UnGraph::<String, usize>::with_capacity(adjacency.len(), edges.len());
        let mut node_map = HashMap::with_capacity(adjacency.len());
        for name in adjacency.keys() {
            let idx = graph.add_node(name.clone());
            node_map.insert(name.clone(), idx);
        }
        for ((a, b), evidence) in &edges {
            graph.add_edge(node_map[a], node_map[b], evidence.weight());
        }

        let content_hash = compute_edge_hash(&edges);
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            documents_used,
            documents_skipped,
            %content_hash,
            "co-occurrence graph frozen"
        );

        Self {
            graph,
            node_map,
            content_hash,
            adjacency,
            edges,
            entities,
            documents_used,
            documents_skipped,
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub const fn documents_used(&self) -> usize {
        self.documents_used
    }

    #[must_use]
    pub const fn documents_skipped(&self) -> usize {
        self.documents_skipped
    }

    /// Canonical name of a node.
    #[must_use]
    pub fn entity(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// All canonical names, sorted.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    /// Weight of `{a, b}` in either argument order; 0 when absent.
    #[must_use]
    pub fn weight(&self, a: &str, b: &str) -> usize {
        self.adjacency
            .get(a)
            .and_then(|nbrs| nbrs.get(b))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct neighbors.
    #[must_use]
    pub fn degree(&self, name: &str) -> usize {
        self.adjacency.get(name).map_or(0, BTreeMap::len)
    }

    /// Edges in canonical order with their evidence.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &Evidence)> {
        self.edges
            .iter()
            .map(|((a, b), ev)| (a.as_str(), b.as_str(), ev))
    }

    /// Sum of all edge weights.
    #[must_use]
    pub fn total_weight(&self) -> usize {
        self.edges.values().map(Evidence::weight).sum()
    }

    /// Distinct documents in which the entity co-occurs with another.
    #[must_use]
    pub fn entity_documents(&self, name: &str) -> BTreeSet<&str> {
        self.entities
            .get(name)
            .map(|ev| ev.documents.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Pages on which the entity itself was mentioned, sorted.
    #[must_use]
    pub fn entity_citations(&self, name: &str) -> Vec<Citation> {
        self.entities
            .get(name)
            .map(|ev| ev.citations.iter().cloned().collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn compute_edge_hash(edges: &BTreeMap<EdgeKey, Evidence>) -> String {
    let mut hasher = blake3::Hasher::new();
    for ((a, b), evidence) in edges {
        hasher.update(a.as_bytes());
        hasher.update(b"\x00");
        hasher.update(b.as_bytes());
        hasher.update(b"\x00");
        hasher.update(evidence.weight().to_string().as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
