use criterion::{black_box, criterion_group, criterion_main, Criterion};

use graph_blast::graph::NodeTable;
use graph_blast::search::{parser, HitTable, QueryStore, Target, TargetIndex};

const N_NODES: usize = 2_000;
const N_QUERIES: usize = 50;

fn make_nodes() -> NodeTable {
    let mut t = NodeTable::new();
    for i in 0..N_NODES {
        t.insert(i.to_string(), vec![b'A'; 1_000]);
    }
    t
}

fn make_queries() -> QueryStore {
    let mut q = QueryStore::new();
    for i in 0..N_QUERIES {
        q.add_query(&format!("query{}", i), vec![b'C'; 500]).unwrap();
    }
    q
}

/// 伪随机生成 outfmt 6 输出，约 1/10 为反向链
fn make_output(lines: usize) -> String {
    let mut x: u32 = 42;
    let mut out = String::with_capacity(lines * 80);
    for _ in 0..lines {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let node = (x >> 8) as usize % N_NODES;
        let query = (x >> 4) as usize % N_QUERIES;
        let start = 1 + (x >> 16) % 800;
        let (ns, ne) = if x % 10 == 0 { (start + 100, start) } else { (start, start + 100) };
        out.push_str(&format!(
            "query{}\tNODE_{}_length_1000\t97.2\t101\t3\t0\t1\t101\t{}\t{}\t1e-30\t180\n",
            query, node, ns, ne
        ));
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let nodes = make_nodes();
    let raw = make_output(10_000);

    c.bench_function("parse_10k_lines", |b| {
        b.iter(|| {
            let mut queries = make_queries();
            let mut hits = HitTable::new();
            black_box(parser::parse(black_box(&raw), &mut queries, &nodes, &mut hits).unwrap());
        })
    });
}

fn bench_select_target(c: &mut Criterion) {
    let nodes = make_nodes();
    let raw = make_output(10_000);
    let mut queries = make_queries();
    let mut hits = HitTable::new();
    parser::parse(&raw, &mut queries, &nodes, &mut hits).unwrap();
    let ids = queries.ids();
    let mut index = TargetIndex::new();

    c.bench_function("rebuild_index_all", |b| {
        b.iter(|| {
            index.rebuild(black_box(&ids), &hits);
            black_box(index.total());
        })
    });

    let one = queries.query_by_name("query7").map(|q| vec![q.id()]).unwrap();
    c.bench_function("rebuild_index_one_query", |b| {
        b.iter(|| {
            index.rebuild(black_box(&one), &hits);
            black_box(Target::from("query7"));
        })
    });
}

criterion_group!(benches, bench_parse, bench_select_target);
criterion_main!(benches);
