use boxpack::entities::BPInstance;
use boxpack::io::generator::ProblemSpecification;
use boxpack_opt::algorithm::{AlgorithmKind, init};
use boxpack_opt::config::BPConfig;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

criterion_main!(benches);
criterion_group!(benches, greedy_bench, local_search_bench);

const N_BOXES: [usize; 3] = [100, 500, 1000];

const GREEDY: [AlgorithmKind; 4] = [
    AlgorithmKind::GreedyAreaDescNormalPosFirstFit,
    AlgorithmKind::GreedyAreaDescNormalPosCircTouch,
    AlgorithmKind::GreedyAreaDescNormalPosCircTouchBestFit,
    AlgorithmKind::GreedyAreaDescSpaceFf,
];

fn create_instance(n_boxes: usize) -> BPInstance {
    let spec = ProblemSpecification::new(20, 1, 7, 1, 7, n_boxes);
    spec.generate(spec.default_seed()).expect("valid specification")
}

/// Time to pack instances of increasing size with each greedy heuristic
fn greedy_bench(c: &mut Criterion) {
    let config = BPConfig::default();
    for kind in GREEDY {
        let mut group = c.benchmark_group(kind.name());
        for n_boxes in N_BOXES {
            let instance = create_instance(n_boxes);
            group.throughput(criterion::Throughput::Elements(n_boxes as u64));
            group.bench_function(BenchmarkId::from_parameter(n_boxes), |b| {
                b.iter(|| init(kind, &instance, &config).optimize())
            });
        }
        group.finish();
    }
}

/// Time to convergence of the local searches, on a single instance
fn local_search_bench(c: &mut Criterion) {
    let config = BPConfig::default();
    let instance = create_instance(100);

    let mut group = c.benchmark_group("local_search_100");
    group.sample_size(10);
    for kind in [
        AlgorithmKind::LocalSearchLocalSequence,
        AlgorithmKind::LocalSearchRepackSpace,
        AlgorithmKind::LocalSearchRelaxedSpace,
    ] {
        group.bench_function(BenchmarkId::from_parameter(kind.short_name()), |b| {
            b.iter(|| init(kind, &instance, &config).optimize())
        });
    }
    group.finish();
}
