//! Classification throughput: events per second through the full gate chain.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use spellres::combat::{
    accumulate, build_intervals, classify, AuraEvent, AuraEventKind, ClassifyContext,
    DamageEvent, HitTypeTable, ModifierInterval, OutcomeCounts, CURSE_MULTIPLIER,
};
use spellres::data::ActorGearProfile;

const TARGET: i64 = 50;

fn synthetic_events(count: usize) -> Vec<DamageEvent> {
    let hit_types = [1u32, 2, 14, 16, 17];
    let landed = [1.0, 0.75, 0.5, 0.25, 0.6];
    (0..count)
        .map(|i| {
            let hit_type = hit_types[i % hit_types.len()];
            let multiplier = if hit_type == 2 || hit_type == 17 { 1.5 } else { 1.0 };
            DamageEvent {
                timestamp: (i as i64) * 37,
                source_id: 1,
                target_id: TARGET,
                ability_id: 10151,
                hit_type,
                amount: 1000.0 * multiplier * landed[i % landed.len()],
                unmitigated_amount: 1000.0,
                tick: false,
            }
        })
        .collect()
}

fn synthetic_modifiers(windows: i64) -> Vec<ModifierInterval> {
    let mut events = Vec::new();
    for w in 0..windows {
        let base = w * 10_000;
        events.push(AuraEvent::new(base, AuraEventKind::Apply, TARGET));
        for s in 1..5 {
            events.push(AuraEvent::new(base + s * 500, AuraEventKind::ApplyStack, TARGET));
        }
        events.push(AuraEvent::new(base + 4000, AuraEventKind::Remove, TARGET));
    }
    build_intervals(&events, TARGET, 0.03)
}

fn bench_classify(c: &mut Criterion) {
    let table = HitTypeTable::standard(1.5);
    let profile = ActorGearProfile {
        spell_hit: 96,
        spell_penetration: 0,
    };
    let curses: Vec<ModifierInterval> = (0..20)
        .map(|i| ModifierInterval::new(i * 20_000, i * 20_000 + 15_000, CURSE_MULTIPLIER))
        .collect();
    let modifiers = synthetic_modifiers(40);
    let ctx = ClassifyContext::new(&table)
        .with_curses(&curses)
        .with_modifiers(&modifiers);

    let mut group = c.benchmark_group("classify");
    for count in [1_000usize, 10_000] {
        let events = synthetic_events(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("events_{count}"), |b| {
            b.iter(|| {
                events.iter().fold(OutcomeCounts::new(), |counts, event| {
                    accumulate(counts, classify(black_box(event), &profile, &ctx))
                })
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
