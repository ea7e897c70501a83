//! Second-order biased walks in the style of node2vec.  The return parameter `p` controls how
//! likely a walk is to step straight back, while the in-out parameter `q` trades off staying
//! near the previous node against moving outward.
use rand::prelude::*;

use crate::algos::batch::Walker;
use crate::error::Result;
use crate::graph::{Graph,NodeID};
use crate::transition::{check_bias,FirstOrderModel,SecondOrderModel};

#[derive(Clone,Copy,Debug)]
pub struct Node2VecParams {
    /// Return parameter
    pub p: f32,

    /// In-out parameter
    pub q: f32
}

impl Default for Node2VecParams {
    fn default() -> Self {
        Node2VecParams { p: 1., q: 1. }
    }
}

impl Node2VecParams {
    pub fn validate(&self) -> Result<()> {
        check_bias("p", self.p)?;
        check_bias("q", self.q)
    }
}

/// There's no previous node until the first step has been taken.
#[derive(Clone,Copy,Debug)]
enum WalkState {
    Start(NodeID),

    /// Arrived at `node` by way of edge slot `edge`
    Biased { edge: usize, node: NodeID }
}

pub struct Node2Vec<'a, G> {
    graph: &'a G,
    first_order: &'a FirstOrderModel,
    second_order: &'a SecondOrderModel
}

impl <'a, G: Graph> Node2Vec<'a, G> {
    pub fn new(
        graph: &'a G,
        first_order: &'a FirstOrderModel,
        second_order: &'a SecondOrderModel
    ) -> Self {
        Node2Vec { graph, first_order, second_order }
    }
}

impl <'a, G: Graph + Sync> Walker for Node2Vec<'a, G> {
    fn walk<R: Rng>(
        &self,
        start_node: NodeID,
        walk_length: usize,
        rng: &mut R,
        output: &mut Vec<NodeID>
    ) {
        output.clear();
        if walk_length == 0 {
            return
        }

        output.push(start_node);
        let mut state = WalkState::Start(start_node);
        while output.len() < walk_length {
            let step = match state {
                WalkState::Start(node) => self.first_order.sample(self.graph, node, rng),
                WalkState::Biased { edge, node } => {
                    self.second_order.sample(self.graph, edge, node, rng)
                }
            };

            match step {
                Some((edge, node)) => {
                    output.push(node);
                    state = WalkState::Biased { edge, node };
                },
                None => break
            }
        }
    }
}
