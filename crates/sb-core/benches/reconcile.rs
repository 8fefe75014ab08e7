use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use sb_core::memory::{MemoryCard, MemorySurface};
use sb_core::{BlockConfig, Reconciler};

fn feed(cards: usize) -> MemorySurface {
    MemorySurface::with_cards((0..cards).map(|i| {
        let name = format!("streamer{}", i);
        let tag = format!("tag{}", i % 40);
        MemoryCard::new(Some(&name), &[&tag, "korean"])
    }))
}

fn config() -> BlockConfig {
    let mut config = BlockConfig::default();
    for i in (0..2_000).step_by(7) {
        config.blocked_streamers.insert(format!("streamer{}", i));
    }
    config.blocked_tags.insert("tag3");
    config.blocked_tags.insert("tag17");
    config
}

fn bench_reconcile(c: &mut Criterion) {
    c.bench_function("full pass, 2000 cards", |b| {
        b.iter_batched(
            || (feed(2_000), Reconciler::new(config())),
            |(mut surface, mut reconciler)| black_box(reconciler.apply(&mut surface)),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("clean pass, 2000 cards", |b| {
        let mut surface = feed(2_000);
        let mut reconciler = Reconciler::new(config());
        reconciler.apply(&mut surface);
        b.iter(|| black_box(reconciler.apply(&mut surface)))
    });
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);
