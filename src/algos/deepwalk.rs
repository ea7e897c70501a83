//! Unbiased, first-order random walks in the style of DeepWalk.
use rand::prelude::*;

use crate::algos::batch::Walker;
use crate::graph::{Graph,NodeID};
use crate::transition::FirstOrderModel;

pub struct DeepWalk<'a, G> {
    graph: &'a G,
    model: &'a FirstOrderModel
}

impl <'a, G: Graph> DeepWalk<'a, G> {
    pub fn new(graph: &'a G, model: &'a FirstOrderModel) -> Self {
        DeepWalk { graph, model }
    }
}

impl <'a, G: Graph + Sync> Walker for DeepWalk<'a, G> {
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
        let mut cur_node = start_node;
        while output.len() < walk_length {
            // Stuck on a node with no out edges
            match self.model.sample(self.graph, cur_node, rng) {
                Some((_edge, next_node)) => {
                    output.push(next_node);
                    cur_node = next_node;
                },
                None => break
            }
        }
    }
}
