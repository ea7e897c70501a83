//! Drives a walker over every node in the graph.  Each node gets its own RNG stream derived
//! from the batch seed, so results don't depend on thread scheduling.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool,Ordering};
use std::time::{Duration,Instant};

use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;
use tracing::info;

use crate::error::{Result,WalkError};
use crate::graph::{Graph,NodeID};
use crate::progress::WalkProgress;

pub const SEED: u64 = 20222022;

pub type Walk = Vec<NodeID>;

pub trait Walker: Sync {
    /// Writes a walk of at most `walk_length` nodes, starting with `start_node`, into
    /// `output`.  Walks only come up short when they hit a node without out edges.
    fn walk<R: Rng>(
        &self,
        start_node: NodeID,
        walk_length: usize,
        rng: &mut R,
        output: &mut Vec<NodeID>
    );
}

/// Cooperative stop signal, checked between nodes.
#[derive(Clone,Debug,Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>
}

impl Cancellation {
    pub fn new() -> Self {
        Cancellation::default()
    }

    /// Trips automatically once `budget` has elapsed.  Budgets too large to represent as an
    /// `Instant` never expire.
    pub fn with_deadline(budget: Duration) -> Self {
        Cancellation {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(budget)
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) ||
            self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }
}

#[derive(Clone,Copy,Debug)]
pub struct WalkBatch {
    /// Maximum number of nodes in a walk, including the start node
    pub walk_length: usize,

    /// Walks started from every node
    pub repeats: usize,

    pub seed: u64,

    pub single_threaded: bool,

    /// Show a progress bar on stderr
    pub progress: bool
}

impl Default for WalkBatch {
    fn default() -> Self {
        WalkBatch {
            walk_length: 30,
            repeats: 15,
            seed: SEED,
            single_threaded: false,
            progress: false
        }
    }
}

impl WalkBatch {

    pub fn validate(&self) -> Result<()> {
        if self.walk_length == 0 {
            return Err(WalkError::parameter("walk_length", self.walk_length))
        }
        if self.repeats == 0 {
            return Err(WalkError::parameter("repeats", self.repeats))
        }
        Ok(())
    }

    /// Generates `repeats` walks for every node, ordered by start node and then repeat.
    pub fn generate<G: Graph + Sync, W: Walker>(
        &self,
        graph: &G,
        walker: &W,
        cancel: Option<&Cancellation>
    ) -> Result<Vec<Walk>> {
        self.validate()?;

        let total = graph.len() * self.repeats;
        let pb = WalkProgress::new(total as u64, self.progress);

        let node_walks = |node_id: NodeID| -> Result<Vec<Walk>> {
            if cancel.map(|c| c.is_cancelled()).unwrap_or(false) {
                return Err(WalkError::Cancelled)
            }

            let walks = (0..self.repeats).map(|r| {
                let task = (node_id * self.repeats + r) as u64;
                let mut rng = XorShiftRng::seed_from_u64(self.seed.wrapping_add(task));
                let mut walk = Vec::with_capacity(self.walk_length);
                walker.walk(node_id, self.walk_length, &mut rng, &mut walk);
                walk
            }).collect();

            pb.inc(self.repeats as u64);
            Ok(walks)
        };

        let walks: Vec<Vec<Walk>> = if self.single_threaded {
            (0..graph.len()).map(node_walks).collect::<Result<Vec<_>>>()
        } else {
            (0..graph.len()).into_par_iter().map(node_walks).collect::<Result<Vec<_>>>()
        }?;
        pb.finish();

        info!("Generated {} walks of up to {} nodes", total, self.walk_length);
        Ok(walks.into_iter().flatten().collect())
    }
}
