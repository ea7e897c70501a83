pub mod batch;
pub mod deepwalk;
pub mod node2vec;
