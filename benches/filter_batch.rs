use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use backscroll::domain::filter::{filter_batch, Direction};
use backscroll::domain::message::{AuthorId, Message, MessageId};
use backscroll::domain::window::MessageWindow;

fn messages(ids: impl Iterator<Item = u64>) -> Vec<Message> {
    ids.map(|id| {
        Message::new(
            MessageId(id),
            AuthorId(id % 4),
            1_700_000_000 + id as i64,
            format!("message {id}"),
        )
    })
    .collect()
}

fn loaded_window(ids: impl Iterator<Item = u64>) -> MessageWindow {
    let mut window = MessageWindow::new();
    window.replace_all(messages(ids));
    window
}

fn benchmark(c: &mut Criterion) {
    let window = loaded_window(1001..=1200);

    let fresh = messages(801..=1000);
    c.bench_function("no-overlap", |b| {
        b.iter_batched(
            || fresh.clone(),
            |batch| filter_batch(black_box(batch), &window, Direction::Older),
            BatchSize::SmallInput,
        )
    });

    let overlapping = messages(901..=1100);
    c.bench_function("half-overlap", |b| {
        b.iter_batched(
            || overlapping.clone(),
            |batch| filter_batch(black_box(batch), &window, Direction::Older),
            BatchSize::SmallInput,
        )
    });

    let duplicate = messages(1001..=1200);
    c.bench_function("fully-duplicate", |b| {
        b.iter_batched(
            || duplicate.clone(),
            |batch| filter_batch(black_box(batch), &window, Direction::Older),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
