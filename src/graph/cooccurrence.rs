//! Weighted co-occurrence graph
//!
//! An adjacency list keyed by source term, one [`CoOccurrenceEdge`] per
//! distinct destination. Every edge remembers the concrete occurrence
//! pairs that produced it, which the phrase assembler later uses to tell
//! which occurrence of a term follows which.

use crate::pagerank::WeightedGraph;
use crate::types::TokenId;
use rustc_hash::FxHashMap;

/// A directed, weighted edge between two terms
#[derive(Debug, Clone, PartialEq)]
pub struct CoOccurrenceEdge {
    pub source: TokenId,
    pub destination: TokenId,
    /// Accumulated weight (one per generating occurrence pair)
    pub count: f64,
    /// `(source_start, destination_start)` of every generating pair
    pub positions: Vec<(usize, usize)>,
}

impl CoOccurrenceEdge {
    fn new(source: TokenId, destination: TokenId) -> Self {
        Self {
            source,
            destination,
            count: 0.0,
            positions: Vec::new(),
        }
    }

    /// Whether this edge was generated by the given occurrence pair
    pub fn has_position(&self, source_start: usize, destination_start: usize) -> bool {
        self.positions.contains(&(source_start, destination_start))
    }
}

/// Co-occurrence graph over the terms of one document
#[derive(Debug, Clone, Default)]
pub struct CoOccurrenceGraph {
    /// Nodes in first-seen order
    nodes: Vec<TokenId>,
    /// Maps node -> position in `nodes`
    node_index: FxHashMap<TokenId, usize>,
    /// Adjacency list: source -> destination -> edge
    adjacency: FxHashMap<TokenId, FxHashMap<TokenId, CoOccurrenceEdge>>,
}

impl CoOccurrenceGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, returning its position in first-seen order
    pub fn add_node(&mut self, node: TokenId) -> usize {
        if let Some(&idx) = self.node_index.get(&node) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(node);
        self.node_index.insert(node, idx);
        idx
    }

    /// Insert or reinforce the edge `source -> destination`
    ///
    /// Returns `false` (and changes nothing) for self-loops.
    pub fn add_edge(
        &mut self,
        source: TokenId,
        destination: TokenId,
        source_start: usize,
        destination_start: usize,
        weight: f64,
    ) -> bool {
        if source == destination {
            return false;
        }

        self.add_node(source);
        self.add_node(destination);

        let edge = self
            .adjacency
            .entry(source)
            .or_default()
            .entry(destination)
            .or_insert_with(|| CoOccurrenceEdge::new(source, destination));
        edge.count += weight;
        edge.positions.push((source_start, destination_start));
        true
    }

    /// Look up the edge `source -> destination`
    pub fn edge(&self, source: TokenId, destination: TokenId) -> Option<&CoOccurrenceEdge> {
        self.adjacency.get(&source)?.get(&destination)
    }

    /// Iterate over the outgoing edges of a node
    pub fn edges_from(&self, source: TokenId) -> impl Iterator<Item = &CoOccurrenceEdge> + '_ {
        self.adjacency
            .get(&source)
            .into_iter()
            .flat_map(|targets| targets.values())
    }

    /// Sum of the weights of all outgoing edges of a node
    pub fn total_outgoing_weight(&self, source: TokenId) -> f64 {
        self.edges_from(source).map(|e| e.count).sum()
    }

    /// Nodes in first-seen order
    pub fn nodes(&self) -> &[TokenId] {
        &self.nodes
    }

    pub fn contains_node(&self, node: TokenId) -> bool {
        self.node_index.contains_key(&node)
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|targets| targets.len()).sum()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl WeightedGraph for CoOccurrenceGraph {
    fn node_ids(&self) -> Vec<TokenId> {
        self.nodes.clone()
    }

    fn out_edges(&self, node: TokenId) -> Vec<(TokenId, f64)> {
        let mut edges: Vec<_> = self
            .edges_from(node)
            .map(|e| (e.destination, e.count))
            .collect();
        // Stable order keeps rank sums reproducible
        edges.sort_by_key(|(target, _)| self.node_index.get(target).copied());
        edges
    }
}
