use rand::prelude::*;
use rand_xorshift::XorShiftRng;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use walkabout::alias::{normalize,AliasTable};
use walkabout::algos::batch::WalkBatch;
use walkabout::algos::deepwalk::DeepWalk;
use walkabout::algos::node2vec::Node2Vec;
use walkabout::graph::CSR;
use walkabout::transition::{FirstOrderModel,SecondOrderModel};

const SEED: u64 = 2022341;

fn build_random_edges(nodes: usize, degree: usize) -> Vec<(usize, usize, f32)> {
    let mut rng = XorShiftRng::seed_from_u64(SEED);
    let mut edges = Vec::with_capacity(nodes * degree * 2);
    for from_node in 0..nodes {
        for _ in 0..degree {
            let to_node = rng.gen_range(0, nodes);
            if to_node != from_node {
                let w = rng.gen_range(0.1f32, 5f32);
                edges.push((from_node, to_node, w));
                edges.push((to_node, from_node, w));
            }
        }
    }
    edges
}

fn alias_tables(c: &mut Criterion) {
    let mut rng = XorShiftRng::seed_from_u64(SEED);
    let weights: Vec<f64> = (0..10_000).map(|_| rng.gen_range(0.1, 10.)).collect();
    let probs = normalize(&weights).unwrap();
    c.bench_function("alias_build_10k", |b| b.iter(|| AliasTable::new(black_box(&probs))));

    let table = AliasTable::new(&probs).unwrap();
    c.bench_function("alias_sample", |b| b.iter(|| table.sample(&mut rng)));
}

fn walks(c: &mut Criterion) {
    let csr = CSR::construct_from_edges(build_random_edges(5_000, 10));
    let first = FirstOrderModel::build(&csr).unwrap();
    let batch = WalkBatch { walk_length: 40, repeats: 2, ..WalkBatch::default() };

    c.bench_function("first_order_tables", |b| b.iter(|| FirstOrderModel::build(&csr)));
    c.bench_function("second_order_tables", |b| b.iter(|| SecondOrderModel::build(&csr, 0.5, 2.)));

    let dw = DeepWalk::new(&csr, &first);
    c.bench_function("deepwalk", |b| b.iter(|| batch.generate(&csr, &dw, None)));

    let second = SecondOrderModel::build(&csr, 0.5, 2.).unwrap();
    let n2v = Node2Vec::new(&csr, &first, &second);
    c.bench_function("node2vec", |b| b.iter(|| batch.generate(&csr, &n2v, None)));
}

criterion_group!(benches, alias_tables, walks);
criterion_main!(benches);
