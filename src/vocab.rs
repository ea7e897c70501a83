//! Maps external node identifiers to dense NodeIDs and back.
use std::sync::Arc;

use hashbrown::HashMap;

use crate::graph::NodeID;

#[derive(Debug,Clone,Default)]
pub struct Vocab {
    name_to_idx: HashMap<Arc<str>, NodeID>,
    idx_to_name: Vec<Arc<str>>
}

impl Vocab {
    pub fn new() -> Self {
        Vocab::default()
    }

    pub fn get_node_id(&self, name: &str) -> Option<NodeID> {
        self.name_to_idx.get(name).copied()
    }

    /// NodeIDs are handed out in first-seen order.
    pub fn get_or_insert(&mut self, name: &str) -> NodeID {
        if let Some(node_id) = self.name_to_idx.get(name) {
            return *node_id
        }
        let node: Arc<str> = Arc::from(name);
        let new_idx = self.idx_to_name.len();
        self.name_to_idx.insert(node.clone(), new_idx);
        self.idx_to_name.push(node);
        new_idx
    }

    pub fn get_name(&self, node: NodeID) -> Option<&Arc<str>> {
        self.idx_to_name.get(node)
    }

    pub fn len(&self) -> usize {
        self.idx_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx_to_name.is_empty()
    }
}
