use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use arb_lattice::algs::ghost::compute_ghost_nodes;
use arb_lattice::algs::local_order::compute_local_permutation;
use arb_lattice::data::connectivity::{ConnectivityChunk, NodeRecord};

const DIRS: [[i64; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Middle third of an `n³` cube, ids x-fastest, records in reverse id order
/// so the permutation has real work to do.
fn cube_slab(n: usize) -> ConnectivityChunk {
    let total = n * n * n;
    let begin = total / 3;
    let end = 2 * total / 3;
    let id = |x: i64, y: i64, z: i64| -> Option<usize> {
        let n = n as i64;
        if (0..n).contains(&x) && (0..n).contains(&y) && (0..n).contains(&z) {
            Some((x + n * (y + n * z)) as usize)
        } else {
            None
        }
    };
    let records: Vec<NodeRecord> = (begin..end)
        .map(|g| {
            let (x, y, z) = ((g % n) as i64, ((g / n) % n) as i64, (g / (n * n)) as i64);
            NodeRecord {
                // Reversed along z so sorting is not a no-op.
                position: [x as f64, y as f64, (n as i64 - z) as f64],
                neighbors: DIRS
                    .iter()
                    .map(|d| id(x + d[0], y + d[1], z + d[2]))
                    .collect(),
                zones: Vec::new(),
            }
        })
        .collect();
    ConnectivityChunk::from_records(begin..end, total, DIRS.len(), 1.0, &records)
        .expect("valid slab")
}

fn bench_local_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_order");
    for &n in &[32usize, 64] {
        let chunk = cube_slab(n);
        group.bench_with_input(BenchmarkId::new("permutation", n), &chunk, |b, chunk| {
            b.iter(|| compute_local_permutation(chunk))
        });
        group.bench_with_input(BenchmarkId::new("ghosts", n), &chunk, |b, chunk| {
            b.iter(|| compute_ghost_nodes(chunk))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_local_order);
criterion_main!(benches);
