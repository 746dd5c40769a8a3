//! Benchmarks for readout correction
//!
//! Run with: cargo bench -p qisim-mitigation

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ndarray::Array1;
use qisim_mitigation::{AssignmentMatrix, correct_probabilities, project_onto_simplex};

fn uniform_confusion(num_qubits: usize, eps: f64) -> AssignmentMatrix {
    let dim = 1 << num_qubits;
    let off = eps / (dim - 1) as f64;
    let rows = (0..dim)
        .map(|i| (0..dim).map(|j| if i == j { 1.0 - eps } else { off }).collect())
        .collect();
    AssignmentMatrix::from_rows(rows).unwrap()
}

/// Benchmark the constrained least-squares solve
fn bench_correction(c: &mut Criterion) {
    let mut group = c.benchmark_group("correct_probabilities");

    for num_qubits in [1usize, 2, 3, 4, 5] {
        let assignment = uniform_confusion(num_qubits, 0.05);
        let dim = assignment.dim();
        let observed: Vec<f64> = (0..dim).map(|i| if i == 0 { 1.0 } else { 0.0 }).collect();
        group.bench_with_input(
            BenchmarkId::new("qubits", num_qubits),
            &observed,
            |b, observed| {
                b.iter(|| correct_probabilities(black_box(observed), black_box(&assignment)));
            },
        );
    }

    group.finish();
}

/// Benchmark the simplex projection
fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_onto_simplex");

    for dim in [4usize, 64, 1024] {
        let v = Array1::from_iter((0..dim).map(|i| (i as f64).sin()));
        group.bench_with_input(BenchmarkId::new("dim", dim), &v, |b, v| {
            b.iter(|| project_onto_simplex(black_box(v.view())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_correction, bench_projection);
criterion_main!(benches);
