//! Random walk generation for graph embeddings.
//!
//! Walks are sampled from precomputed alias tables: one per node for unbiased (DeepWalk)
//! walks, plus one per directed edge for node2vec's second-order walks.  The resulting node
//! sequences are meant to be fed to a skip-gram style trainer.
pub mod alias;
pub mod algos;
pub mod error;
pub mod graph;
pub mod io;
pub mod transition;
pub mod vocab;
mod progress;

#[cfg(feature = "python")]
mod python;

use rayon::prelude::*;

use crate::algos::batch::{Walk,WalkBatch,Walker};
use crate::algos::deepwalk::DeepWalk;
use crate::algos::node2vec::{Node2Vec,Node2VecParams};
use crate::graph::WalkGraph;
use crate::transition::{FirstOrderModel,SecondOrderModel};

pub use crate::algos::batch::{Cancellation,SEED};
pub use crate::error::{Result,WalkError};
pub use crate::graph::{EdgeType,GraphBuilder};

/// Unbiased walks: `repeats` walks of at most `walk_length` nodes from every node.
pub fn generate_unbiased_walks(
    graph: &WalkGraph,
    walk_length: usize,
    repeats: usize,
    seed: u64
) -> Result<Vec<Vec<String>>> {
    let batch = WalkBatch { walk_length, repeats, seed, ..WalkBatch::default() };
    unbiased_walks(graph, &batch, None)
}

/// node2vec walks with return parameter `p` and in-out parameter `q`.
pub fn generate_biased_walks(
    graph: &WalkGraph,
    walk_length: usize,
    repeats: usize,
    p: f32,
    q: f32,
    seed: u64
) -> Result<Vec<Vec<String>>> {
    let batch = WalkBatch { walk_length, repeats, seed, ..WalkBatch::default() };
    biased_walks(graph, &batch, Node2VecParams { p, q }, None)
}

/// Like [`generate_unbiased_walks`], with full control over threading, progress and
/// cancellation.
pub fn unbiased_walks(
    graph: &WalkGraph,
    batch: &WalkBatch,
    cancel: Option<&Cancellation>
) -> Result<Vec<Vec<String>>> {
    batch.validate()?;
    let model = FirstOrderModel::build(graph.graph())?;
    let walker = DeepWalk::new(graph.graph(), &model);
    run_batch(graph, batch, &walker, cancel)
}

/// Like [`generate_biased_walks`], with full control over threading, progress and
/// cancellation.
pub fn biased_walks(
    graph: &WalkGraph,
    batch: &WalkBatch,
    params: Node2VecParams,
    cancel: Option<&Cancellation>
) -> Result<Vec<Vec<String>>> {
    // Fail on bad parameters before spending time on tables
    batch.validate()?;
    params.validate()?;
    let first_order = FirstOrderModel::build(graph.graph())?;
    let second_order = SecondOrderModel::build(graph.graph(), params.p, params.q)?;
    let walker = Node2Vec::new(graph.graph(), &first_order, &second_order);
    run_batch(graph, batch, &walker, cancel)
}

fn run_batch<W: Walker>(
    graph: &WalkGraph,
    batch: &WalkBatch,
    walker: &W,
    cancel: Option<&Cancellation>
) -> Result<Vec<Vec<String>>> {
    let walks: Vec<Walk> = batch.generate(graph.graph(), walker, cancel)?;
    Ok(walks.par_iter().map(|walk| graph.names(walk)).collect())
}
