//! Precomputed transition tables.  The first-order model holds one alias table per node, the
//! second-order model one per directed edge, both indexed by position so the walk loop never
//! hashes.  Table indices refer to positions within the graph's (sorted) neighbor rows.
use rand::prelude::*;
use rayon::prelude::*;
use tracing::info;

use crate::alias::AliasTable;
use crate::error::{Result,WalkError};
use crate::graph::{Graph,NodeID};

/// A sampled move: the edge slot that was traversed and the node it lands on.
pub type Step = (usize, NodeID);

fn sample_row<G: Graph, R: Rng>(
    graph: &G,
    table: &AliasTable,
    node: NodeID,
    rng: &mut R
) -> Step {
    let idx = table.sample(rng);
    let (start, _stop) = graph.get_edge_range(node);
    (start + idx, graph.get_edges(node).0[idx])
}

/// DeepWalk transitions: each node's out edges, weighted by edge weight.
#[derive(Debug,Clone)]
pub struct FirstOrderModel {
    tables: Vec<Option<AliasTable>>
}

impl FirstOrderModel {
    pub fn build<G: Graph + Sync>(graph: &G) -> Result<Self> {
        let tables = (0..graph.len()).into_par_iter()
            .map(|node| {
                let (_edges, weights) = graph.get_edges(node);
                if weights.is_empty() {
                    return Ok(None)
                }
                let weights: Vec<f64> = weights.iter().map(|w| *w as f64).collect();
                AliasTable::from_weights(&weights).map(Some)
            })
            .collect::<Result<Vec<_>>>()?;

        let terminal = tables.iter().filter(|t| t.is_none()).count();
        info!("Built first-order tables for {} nodes ({} terminal)", tables.len(), terminal);
        Ok(FirstOrderModel { tables })
    }

    /// None when the node has no out edges.
    pub fn table(&self, node: NodeID) -> Option<&AliasTable> {
        self.tables.get(node).and_then(|t| t.as_ref())
    }

    pub fn sample<G: Graph, R: Rng>(&self, graph: &G, node: NodeID, rng: &mut R) -> Option<Step> {
        self.table(node).map(|table| sample_row(graph, table, node, rng))
    }
}

/// node2vec transitions: for every edge t -> v, v's out edges reweighted by where they lead
/// relative to t.
#[derive(Debug,Clone)]
pub struct SecondOrderModel {
    tables: Vec<Option<AliasTable>>
}

impl SecondOrderModel {
    pub fn build<G: Graph + Sync>(graph: &G, p: f32, q: f32) -> Result<Self> {
        check_bias("p", p)?;
        check_bias("q", q)?;

        let rows = (0..graph.len()).into_par_iter()
            .map(|prev| {
                graph.get_edges(prev).0.iter()
                    .map(|cur| {
                        if graph.degree(*cur) == 0 {
                            return Ok(None)
                        }
                        let weights = biased_weights(graph, prev, *cur, p as f64, q as f64);
                        AliasTable::from_weights(&weights).map(Some)
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        // Rows are visited in node order, so flattening lines tables up with edge slots
        let tables: Vec<_> = rows.into_iter().flatten().collect();
        info!("Built second-order tables for {} edges (p={}, q={})", tables.len(), p, q);
        Ok(SecondOrderModel { tables })
    }

    /// Table for the edge occupying `edge` in the graph's edge arrays.
    pub fn edge_table(&self, edge: usize) -> Option<&AliasTable> {
        self.tables.get(edge).and_then(|t| t.as_ref())
    }

    /// Table used when the walk arrived at `cur` from `prev`.
    pub fn table<G: Graph>(&self, graph: &G, prev: NodeID, cur: NodeID) -> Option<&AliasTable> {
        let (start, _stop) = graph.get_edge_range(prev);
        graph.get_edges(prev).0.binary_search(&cur).ok()
            .and_then(|idx| self.edge_table(start + idx))
    }

    /// Samples the next move after traversing `edge`, which must end at `cur`.
    pub fn sample<G: Graph, R: Rng>(
        &self,
        graph: &G,
        edge: usize,
        cur: NodeID,
        rng: &mut R
    ) -> Option<Step> {
        self.edge_table(edge).map(|table| sample_row(graph, table, cur, rng))
    }
}

pub(crate) fn check_bias(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        Err(WalkError::parameter(name, value))
    }
}

/// Unnormalized node2vec weights for leaving `cur` having arrived from `prev`.
fn biased_weights<G: Graph>(graph: &G, prev: NodeID, cur: NodeID, p: f64, q: f64) -> Vec<f64> {
    let (edges, weights) = graph.get_edges(cur);
    edges.iter().zip(weights.iter())
        .map(|(next, w)| {
            let w = *w as f64;
            if *next == prev {
                w / p
            } else if graph.has_edge(*next, prev) {
                w
            } else {
                w / q
            }
        })
        .collect()
}

#[cfg(test)]
mod transition_tests {
    use super::*;
    use crate::graph::{CSR,EdgeType,GraphBuilder,WalkGraph};
    use rand_xorshift::XorShiftRng;

    // Triangle a-b-c with d hanging off of a
    fn build_graph() -> WalkGraph {
        let mut builder = GraphBuilder::new();
        builder.add_edge("a", "b", 1., EdgeType::Undirected);
        builder.add_edge("b", "c", 1., EdgeType::Undirected);
        builder.add_edge("c", "a", 1., EdgeType::Undirected);
        builder.add_edge("a", "d", 1., EdgeType::Undirected);
        builder.build().unwrap()
    }

    fn assert_close(left: &[f64], right: &[f64]) {
        assert_eq!(left.len(), right.len());
        for (l, r) in left.iter().zip(right.iter()) {
            assert!((l - r).abs() < 1e-9, "{:?} != {:?}", left, right);
        }
    }

    #[test]
    fn test_first_order() {
        let csr = CSR::construct_from_edges(vec![
            (0, 1, 1.),
            (0, 2, 3.),
            (1, 0, 2.),
        ]);
        let model = FirstOrderModel::build(&csr).unwrap();
        assert_close(&model.table(0).unwrap().probabilities(), &[0.25, 0.75]);
        assert_close(&model.table(1).unwrap().probabilities(), &[1.]);
        assert!(model.table(2).is_none());

        let mut rng = XorShiftRng::seed_from_u64(20222022);
        assert_eq!(model.sample(&csr, 1, &mut rng), Some((2, 0)));
        assert_eq!(model.sample(&csr, 2, &mut rng), None);
    }

    #[test]
    fn test_return_and_outward_bias() {
        let wg = build_graph();
        let graph = wg.graph();
        let model = SecondOrderModel::build(graph, 2., 0.5).unwrap();
        let (a, b, d) = (wg.get_node_id("a").unwrap(), wg.get_node_id("b").unwrap(),
                         wg.get_node_id("d").unwrap());

        // a's neighbors are [b, c, d]. Arriving from d, b and c are two hops out.
        let from_d = model.table(graph, d, a).unwrap().probabilities();
        assert_close(&from_d, &[4. / 9., 4. / 9., 1. / 9.]);

        // Arriving from b, c closes a triangle and d is outward.
        let from_b = model.table(graph, b, a).unwrap().probabilities();
        assert_close(&from_b, &[0.5 / 3.5, 1. / 3.5, 2. / 3.5]);
    }

    #[test]
    fn test_unbiased_matches_first_order() {
        let wg = build_graph();
        let graph = wg.graph();
        let first = FirstOrderModel::build(graph).unwrap();
        let second = SecondOrderModel::build(graph, 1., 1.).unwrap();

        for prev in 0..graph.len() {
            for cur in graph.get_edges(prev).0.iter() {
                assert_eq!(second.table(graph, prev, *cur), first.table(*cur));
            }
        }
    }

    #[test]
    fn test_directed_bias_uses_edges_back_to_prev() {
        // 0 -> 1, then from 1 we can reach 2 (no way back to 0) or 3 (3 -> 0 exists)
        let csr = CSR::construct_from_edges(vec![
            (0, 1, 1.),
            (1, 2, 1.),
            (1, 3, 1.),
            (3, 0, 1.),
        ]);
        let model = SecondOrderModel::build(&csr, 1., 0.5).unwrap();
        assert_close(&model.table(&csr, 0, 1).unwrap().probabilities(), &[2. / 3., 1. / 3.]);

        // 2 is a dead end
        assert!(model.table(&csr, 1, 2).is_none());
        assert!(model.table(&csr, 0, 3).is_none());
    }

    #[test]
    fn test_invalid_parameters() {
        let wg = build_graph();
        for (p, q) in [(0., 1.), (1., -1.), (f32::NAN, 1.), (1., f32::INFINITY)].iter() {
            let res = SecondOrderModel::build(wg.graph(), *p, *q);
            assert!(matches!(res, Err(WalkError::InvalidParameter { .. })));
        }
    }

    #[test]
    fn test_invalid_weights() {
        let csr = CSR::construct_from_edges(vec![(0, 1, 1.), (0, 2, -1.), (1, 0, 1.)]);
        assert!(matches!(FirstOrderModel::build(&csr), Err(WalkError::InvalidWeight(_))));
        assert!(matches!(SecondOrderModel::build(&csr, 1., 1.), Err(WalkError::InvalidWeight(_))));
    }

}
