//! Benchmark for loot generation performance.
//!
//! Run with: cargo bench --package runefall_loot --bench loot_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use runefall_loot::{
    LootContext, LootEntry, LootEnv, LootFunction, LootPool, LootPredicate, LootTable,
    NumberProvider, ParamSet, TableKey,
};
use std::sync::Arc;

fn create_test_env() -> LootEnv {
    let mut env = LootEnv::new();
    env.register_table(
        TableKey::new("bench:gems"),
        LootTable::new(ParamSet::Empty).with_pool(
            LootPool::new(NumberProvider::Constant(1.0))
                .with_entry(LootEntry::item(200).with_weight(9))
                .with_entry(LootEntry::item(201).with_weight(1).with_quality(2.0)),
        ),
    );
    env.register_table(
        TableKey::new("bench:chest"),
        LootTable::new(ParamSet::Empty)
            .with_pool(
                LootPool::new(NumberProvider::Uniform { min: 2.0, max: 5.0 })
                    .with_entry(LootEntry::item(100).with_weight(70).with_function(
                        LootFunction::SetCount(NumberProvider::Uniform { min: 1.0, max: 3.0 }),
                    ))
                    .with_entry(LootEntry::item(101).with_weight(20))
                    .with_entry(
                        LootEntry::item(102)
                            .with_weight(8)
                            .with_condition(LootPredicate::RandomChance { chance: 0.5 }),
                    )
                    .with_entry(LootEntry::item(103).with_weight(2)),
            )
            .with_pool(
                LootPool::new(NumberProvider::Constant(1.0))
                    .with_entry(LootEntry::table_ref(TableKey::new("bench:gems"))),
            ),
    );
    env
}

fn benchmark_single_population(c: &mut Criterion) {
    let env = create_test_env();
    let table = env.tables().resolve(&TableKey::new("bench:chest"));

    c.bench_function("single_table_population", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            let mut ctx = LootContext::builder(&env)
                .with_seed(black_box(seed))
                .build(ParamSet::Empty)
                .unwrap();
            black_box(LootTable::collect_items(&table, &mut ctx))
        });
    });
}

fn benchmark_pool_draw(c: &mut Criterion) {
    let env = LootEnv::new();
    let table = Arc::new(
        LootTable::new(ParamSet::Empty).with_pool(
            LootPool::new(NumberProvider::Constant(1.0))
                .with_entry(LootEntry::item(1).with_weight(70))
                .with_entry(LootEntry::item(2).with_weight(20))
                .with_entry(LootEntry::item(3).with_weight(8))
                .with_entry(LootEntry::item(4).with_weight(2)),
        ),
    );

    let mut group = c.benchmark_group("weighted_draws");
    group.throughput(Throughput::Elements(10_000));
    group.sample_size(20);

    group.bench_function("10k_draws", |b| {
        b.iter(|| {
            for seed in 0..10_000u64 {
                let mut ctx = LootContext::builder(&env)
                    .with_seed(seed)
                    .build(ParamSet::Empty)
                    .unwrap();
                black_box(LootTable::collect_items(&table, &mut ctx));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_single_population, benchmark_pool_draw);
criterion_main!(benches);
