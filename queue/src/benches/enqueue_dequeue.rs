use criterion::{black_box, criterion_group, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use random_queue::{Queue, RandomQueue};

fn bench_enqueue_dequeue(c: &mut Criterion) {
    for n in [20, 20_000] {
        c.bench_function(
            &format!("{}/structure=random_queue n={}", module_path!(), n),
            |b| {
                b.iter(|| {
                    let mut rng = StdRng::seed_from_u64(0);
                    let mut queue = RandomQueue::new();
                    for i in 0..n {
                        queue.enqueue_with(i, &mut rng);
                    }
                    while let Some(element) = queue.dequeue() {
                        black_box(element);
                    }
                })
            },
        );

        // Uniform removal from a vector by swapping the drawn element to the end
        c.bench_function(
            &format!("{}/structure=vec_swap_remove n={}", module_path!(), n),
            |b| {
                b.iter(|| {
                    let mut rng = StdRng::seed_from_u64(0);
                    let mut vec = Vec::new();
                    for i in 0..n {
                        vec.push(i);
                    }
                    while !vec.is_empty() {
                        let index = rng.gen_range(0..vec.len());
                        black_box(vec.swap_remove(index));
                    }
                })
            },
        );
    }
}

fn bench_interleaved(c: &mut Criterion) {
    for n in [20, 20_000] {
        c.bench_function(&format!("{}/n={}", module_path!(), n), |b| {
            let mut rng = StdRng::seed_from_u64(0);
            let mut queue = RandomQueue::new();
            queue.enqueue_all_with(0..n, &mut rng);
            b.iter(|| {
                let element = queue.dequeue().unwrap();
                queue.enqueue_with(element, &mut rng);
            })
        });
    }
}

criterion_group!(benches, bench_enqueue_dequeue, bench_interleaved);
