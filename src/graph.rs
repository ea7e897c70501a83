use rayon::prelude::*;
use tracing::{debug,warn};

use crate::error::{Result,WalkError};
use crate::vocab::Vocab;

pub type NodeID = usize;

pub trait Graph {
    /// Get number of nodes in graph
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get number of edges in graph
    fn edges(&self) -> usize;

    /// Get out degree of node in graph
    fn degree(&self, idx: NodeID) -> usize;

    /// Get edges and corresponding weights
    fn get_edges(&self, idx: NodeID) -> (&[NodeID], &[f32]);

    /// Offsets of a node's edges into the flat edge arrays.  Edge slots are stable, so models
    /// can key data by them.
    fn get_edge_range(&self, idx: NodeID) -> (usize, usize);

    /// Tests whether the directed edge from -> to exists
    fn has_edge(&self, from: NodeID, to: NodeID) -> bool;

}

/// Compressed Sparse Row Format.  We use this for graphs since adjancency
/// lists tend to use more memory.  Each row is sorted by destination node, which
/// fixes the neighbor order transition tables are built against.
#[derive(Debug,Clone)]
pub struct CSR {
    rows: Vec<usize>,
    columns: Vec<NodeID>,
    weights: Vec<f32>
}

impl CSR {
    /// Builds a graph whose node count is implied by the largest node in the edge list.
    pub fn construct_from_edges(edges: Vec<(NodeID, NodeID, f32)>) -> Self {
        let num_nodes = edges.iter()
            .map(|(from_node, to_node, _)| *from_node.max(to_node) + 1)
            .max()
            .unwrap_or(0);

        CSR::with_nodes(num_nodes, edges)
    }

    /// Builds a graph with exactly `num_nodes` nodes, some of which may have no edges.
    pub fn with_nodes(num_nodes: usize, mut edges: Vec<(NodeID, NodeID, f32)>) -> Self {
        let num_nodes = edges.iter()
            .map(|(from_node, to_node, _)| *from_node.max(to_node) + 1)
            .fold(num_nodes, usize::max);

        edges.par_sort_by_key(|(from_node, to_node, _)| (*from_node, *to_node));

        // Figure out how many out edges per node, then convert to row offset format
        let mut rows = vec![0; num_nodes + 1];
        edges.iter().for_each(|(from_node, _to_node, _w)| {
            rows[*from_node + 1] += 1;
        });

        let mut offset = 0;
        rows.iter_mut().skip(1).for_each(|count| {
            offset += *count;
            *count = offset;
        });

        // Edges are sorted, so they already sit in row order
        let (columns, weights) = edges.into_iter()
            .map(|(_from_node, to_node, weight)| (to_node, weight))
            .unzip();

        CSR { rows, columns, weights }
    }

}

impl Graph for CSR {
    fn len(&self) -> usize {
        self.rows.len() - 1
    }

    fn edges(&self) -> usize {
        self.weights.len()
    }

    fn degree(&self, idx: NodeID) -> usize {
        self.rows[idx+1] - self.rows[idx]
    }

    fn get_edges(&self, idx: NodeID) -> (&[NodeID], &[f32]) {
        let (start, stop) = self.get_edge_range(idx);
        (&self.columns[start..stop], &self.weights[start..stop])
    }

    fn get_edge_range(&self, idx: NodeID) -> (usize, usize) {
        (self.rows[idx], self.rows[idx+1])
    }

    fn has_edge(&self, from: NodeID, to: NodeID) -> bool {
        self.get_edges(from).0.binary_search(&to).is_ok()
    }

}

#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum EdgeType {
    Directed,
    Undirected
}

/// A CSR graph paired with the vocabulary that names its nodes.
#[derive(Debug,Clone)]
pub struct WalkGraph {
    graph: CSR,
    vocab: Vocab
}

impl WalkGraph {
    pub fn graph(&self) -> &CSR {
        &self.graph
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn get_node_id(&self, name: &str) -> Result<NodeID> {
        self.vocab.get_node_id(name)
            .ok_or_else(|| WalkError::UnknownNode(name.to_string()))
    }

    /// Converts a walk over NodeIDs back into node names.
    pub fn names(&self, walk: &[NodeID]) -> Vec<String> {
        walk.iter()
            .filter_map(|node_id| self.vocab.get_name(*node_id))
            .map(|name| name.to_string())
            .collect()
    }
}

/// Accumulates named edges and produces a validated WalkGraph.
#[derive(Debug,Default)]
pub struct GraphBuilder {
    vocab: Vocab,
    edges: Vec<(NodeID, NodeID, f32)>
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder::default()
    }

    /// Registers a node, even if it never receives an edge.
    pub fn add_node(&mut self, name: &str) -> NodeID {
        self.vocab.get_or_insert(name)
    }

    /// Adds an edge.  Self loops are dropped, returning false.  Adding the same edge twice
    /// keeps the most recent weight.
    pub fn add_edge(
        &mut self,
        from_node: &str,
        to_node: &str,
        weight: f32,
        edge_type: EdgeType
    ) -> bool {
        if from_node == to_node {
            warn!("Skipping self loop on node '{}'", from_node);
            return false
        }

        let f_id = self.vocab.get_or_insert(from_node);
        let t_id = self.vocab.get_or_insert(to_node);
        self.edges.push((f_id, t_id, weight));
        if matches!(edge_type, EdgeType::Undirected) {
            self.edges.push((t_id, f_id, weight));
        }
        true
    }

    pub fn build(self) -> Result<WalkGraph> {
        let GraphBuilder { vocab, mut edges } = self;

        // Reject the whole graph rather than silently dropping edges
        if let Some((f, t, w)) = edges.iter().find(|(_, _, w)| !(w.is_finite() && *w > 0.)) {
            let name = |n: &NodeID| vocab.get_name(*n).map(|s| s.to_string()).unwrap_or_default();
            return Err(WalkError::InvalidWeight(
                format!("edge '{}' -> '{}' has weight {}", name(f), name(t), w)))
        }

        deduplicate_edges(&mut edges);
        debug!("Constructing CSR with {} nodes and {} edges", vocab.len(), edges.len());
        let graph = CSR::with_nodes(vocab.len(), edges);
        Ok(WalkGraph { graph, vocab })
    }
}

/// Collapses repeated (from, to) pairs, keeping the last weight added.
fn deduplicate_edges(edges: &mut Vec<(NodeID, NodeID, f32)>) {
    // Stable, so insertion order survives within each run
    edges.par_sort_by_key(|e| (e.0, e.1));
    let mut i = 0;
    for j in 0..edges.len() {
        if i > 0 && edges[i - 1].0 == edges[j].0 && edges[i - 1].1 == edges[j].1 {
            edges[i - 1] = edges[j];
        } else {
            edges[i] = edges[j];
            i += 1;
        }
    }
    edges.truncate(i);
}
