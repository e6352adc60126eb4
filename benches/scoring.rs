use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tenpin::core::{is_split, Scoresheet};
use tenpin::types::Leave;

fn mixed_game() -> Vec<Leave> {
    let leave = |n: &[u8]| Leave::from_numbers(n).unwrap_or(Leave::FULL);
    vec![
        leave(&[1, 2, 3, 5, 6, 9, 10]),
        leave(&[10]),
        leave(&[10]),
        leave(&[10]),
        Leave::EMPTY,
        Leave::EMPTY,
        Leave::FULL,
        Leave::EMPTY,
        Leave::EMPTY,
        leave(&[10]),
        leave(&[10]),
        Leave::EMPTY,
        Leave::EMPTY,
        leave(&[7, 10]),
        leave(&[7]),
    ]
}

fn bench_record_game(c: &mut Criterion) {
    let deliveries = mixed_game();

    c.bench_function("record_full_game", |b| {
        b.iter(|| {
            let mut sheet = Scoresheet::new();
            for &leave in &deliveries {
                let _ = sheet.record_delivery(black_box(leave));
            }
            sheet
        })
    });
}

fn bench_update_running_score(c: &mut Criterion) {
    let mut sheet = Scoresheet::new();
    for leave in mixed_game() {
        let _ = sheet.record_delivery(leave);
    }

    c.bench_function("update_running_score", |b| {
        b.iter(|| {
            black_box(&mut sheet).update_running_score();
        })
    });
}

fn bench_is_split(c: &mut Criterion) {
    c.bench_function("is_split_all_leaves", |b| {
        b.iter(|| {
            (0u16..1 << 10)
                .filter(|&bits| is_split(black_box(Leave::from_bits(bits))))
                .count()
        })
    });
}

fn bench_observation(c: &mut Criterion) {
    let mut sheet = Scoresheet::new();
    for leave in mixed_game() {
        let _ = sheet.record_delivery(leave);
    }
    sheet.update_running_score();

    c.bench_function("build_observation_json", |b| {
        b.iter(|| {
            let obs = tenpin::adapter::build_observation(black_box(&sheet), 1);
            serde_json::to_string(&obs).map(|s| s.len()).unwrap_or(0)
        })
    });
}

criterion_group!(
    benches,
    bench_record_game,
    bench_update_running_score,
    bench_is_split,
    bench_observation
);
criterion_main!(benches);
