//! Deep copy vs move of envelopes with large payloads.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use envelope::{Message, MessageType, Tensor};

fn large_message(elements: usize) -> Message {
    let payloads = vec![
        Tensor::vector(vec![0.5f32; elements]),
        Tensor::vector(vec![1i64; elements / 2]),
    ];
    Message::with_id(vec![0u8; 256], payloads, MessageType::OperationRequest, 1)
}

fn bench_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope_transfer");

    for elements in [1_024usize, 65_536, 1_048_576] {
        group.bench_with_input(BenchmarkId::new("clone", elements), &elements, |b, &n| {
            let message = large_message(n);
            b.iter(|| black_box(message.clone()));
        });

        group.bench_with_input(BenchmarkId::new("take", elements), &elements, |b, &n| {
            let mut message = large_message(n);
            b.iter(|| {
                let mut moved = message.take();
                // put it back so every iteration moves a full envelope
                message.swap(&mut moved);
                black_box(&message);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transfer);
criterion_main!(benches);
