//! Python bindings.  Walks come back as lists of node names, ready for gensim's Word2Vec.
use std::sync::Arc;

use pyo3::prelude::*;
use pyo3::exceptions::{PyIOError,PyValueError};

use crate::algos::batch::WalkBatch;
use crate::algos::node2vec::Node2VecParams;
use crate::error::WalkError;
use crate::graph::{self,Graph,EdgeType as GEdgeType};
use crate::io::{EdgeListReader,WalkWriter};
use crate::SEED;

impl From<WalkError> for PyErr {
    fn from(e: WalkError) -> PyErr {
        match e {
            WalkError::Io(e) => PyIOError::new_err(e.to_string()),
            e => PyValueError::new_err(e.to_string())
        }
    }
}

#[pyclass]
#[derive(Clone)]
enum EdgeType {
    Directed,
    Undirected
}

impl From<EdgeType> for GEdgeType {
    fn from(et: EdgeType) -> GEdgeType {
        match et {
            EdgeType::Directed => GEdgeType::Directed,
            EdgeType::Undirected => GEdgeType::Undirected
        }
    }
}

#[pyclass]
struct GraphBuilder {
    builder: graph::GraphBuilder
}

#[pymethods]
impl GraphBuilder {
    #[new]
    pub fn new() -> Self {
        GraphBuilder { builder: graph::GraphBuilder::new() }
    }

    pub fn add_node(&mut self, name: String) {
        self.builder.add_node(&name);
    }

    pub fn add_edge(
        &mut self,
        from_node: String,
        to_node: String,
        weight: f32,
        edge_type: EdgeType
    ) -> bool {
        self.builder.add_edge(&from_node, &to_node, weight, edge_type.into())
    }

    pub fn build_graph(&mut self) -> PyResult<WalkGraph> {
        let builder = std::mem::take(&mut self.builder);
        Ok(WalkGraph { graph: Arc::new(builder.build()?) })
    }
}

#[pyclass]
struct WalkGraph {
    graph: Arc<graph::WalkGraph>
}

impl WalkGraph {
    fn batch(walk_length: usize, repeats: usize, seed: Option<u64>, progress: Option<bool>) -> WalkBatch {
        WalkBatch {
            walk_length,
            repeats,
            seed: seed.unwrap_or(SEED),
            single_threaded: false,
            progress: progress.unwrap_or(false)
        }
    }
}

#[pymethods]
impl WalkGraph {

    #[staticmethod]
    pub fn load(path: String, edge_type: EdgeType, weighted: Option<bool>) -> PyResult<Self> {
        let reader = EdgeListReader {
            edge_type: edge_type.into(),
            weighted: weighted.unwrap_or(false),
            ..EdgeListReader::default()
        };
        Ok(WalkGraph { graph: Arc::new(reader.load(&path)?) })
    }

    pub fn contains_node(&self, name: String) -> bool {
        self.graph.get_node_id(&name).is_ok()
    }

    pub fn nodes(&self) -> usize {
        self.graph.len()
    }

    pub fn edges(&self) -> usize {
        self.graph.graph().edges()
    }

    pub fn get_edges(&self, node: String) -> PyResult<(Vec<String>, Vec<f32>)> {
        let node_id = self.graph.get_node_id(&node)?;
        let (edges, weights) = self.graph.graph().get_edges(node_id);
        Ok((self.graph.names(edges), weights.to_vec()))
    }

    pub fn deepwalk(
        &self,
        py: Python<'_>,
        walk_length: usize,
        repeats: usize,
        seed: Option<u64>,
        progress: Option<bool>
    ) -> PyResult<Vec<Vec<String>>> {
        let batch = WalkGraph::batch(walk_length, repeats, seed, progress);
        let graph = self.graph.clone();
        Ok(py.allow_threads(move || crate::unbiased_walks(&graph, &batch, None))?)
    }

    pub fn node2vec(
        &self,
        py: Python<'_>,
        walk_length: usize,
        repeats: usize,
        p: f32,
        q: f32,
        seed: Option<u64>,
        progress: Option<bool>
    ) -> PyResult<Vec<Vec<String>>> {
        let batch = WalkGraph::batch(walk_length, repeats, seed, progress);
        let params = Node2VecParams { p, q };
        let graph = self.graph.clone();
        Ok(py.allow_threads(move || crate::biased_walks(&graph, &batch, params, None))?)
    }
}

/// Writes walks one per line, space separated.  `.gz` paths are compressed.
#[pyfunction]
fn save_walks(path: String, walks: Vec<Vec<String>>, comp_level: Option<u32>) -> PyResult<()> {
    let mut writer = WalkWriter::new(&path, comp_level)?;
    writer.stream(walks.iter())?;
    writer.finish()?;
    Ok(())
}

#[pymodule]
fn walkabout(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<GraphBuilder>()?;
    m.add_class::<EdgeType>()?;
    m.add_class::<WalkGraph>()?;
    m.add_function(wrap_pyfunction!(save_walks, m)?)?;
    Ok(())
}
