use criterion::*;
use semaphore_poseidon::{Poseidon, hash2};

fn poseidon_bench(c: &mut Criterion) {
    c.bench_function("Poseidon Permutation (t=2)", |b| {
        let poseidon = Poseidon::<ark_bn254::Fr, 2>::default();
        let input = [ark_bn254::Fr::from(42u64), ark_bn254::Fr::from(43u64)];

        b.iter(|| poseidon.permutation(&input));
    });
    c.bench_function("Poseidon Permutation (t=3)", |b| {
        let poseidon = Poseidon::<ark_bn254::Fr, 3>::default();
        let input = [
            ark_bn254::Fr::from(42u64),
            ark_bn254::Fr::from(43u64),
            ark_bn254::Fr::from(44u64),
        ];

        b.iter(|| poseidon.permutation(&input));
    });
    c.bench_function("hash2", |b| {
        let left = ark_bn254::Fr::from(31213u64);
        let right = ark_bn254::Fr::from(132u64);

        b.iter(|| hash2(black_box(left), black_box(right)));
    });
}

criterion_group!(benches, poseidon_bench);
criterion_main!(benches);
