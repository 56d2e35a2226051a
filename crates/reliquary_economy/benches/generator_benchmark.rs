//! Benchmark for item generation.
//!
//! Run with: cargo bench --package reliquary_economy --bench generator_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use reliquary_economy::{
    AffixKind, Catalog, EquipmentSlot, ItemCategory, ItemGenerator, ItemTemplate, LootProfile,
    RarityDropTable, RarityGates,
};

fn create_test_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .insert(
            ItemTemplate::new("iron-sword", "Iron Sword", ItemCategory::Equipment)
                .equippable_in(EquipmentSlot::Weapon)
                .with_affixes([AffixKind::Athlete, AffixKind::Champion, AffixKind::Paragon]),
        )
        .expect("fresh catalog");
    catalog
}

fn benchmark_single_roll(c: &mut Criterion) {
    let catalog = create_test_catalog();
    let template = catalog.get("iron-sword").expect("registered").clone();
    let generator = ItemGenerator::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    c.bench_function("single_item_roll", |b| {
        let mut level = 0u32;
        b.iter(|| {
            level = level % 30 + 1;
            black_box(generator.roll(&template, black_box(level), &mut rng))
        });
    });
}

fn benchmark_rarity_sampling(c: &mut Criterion) {
    let table = RarityDropTable::new(RarityGates::default());
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    let mut group = c.benchmark_group("rarity_sampling");
    group.throughput(Throughput::Elements(100_000));
    group.sample_size(10);

    group.bench_function("100k_samples", |b| {
        b.iter(|| {
            for i in 0..100_000u32 {
                black_box(table.sample(i % 30 + 1, &mut rng));
            }
        });
    });

    group.finish();
}

fn benchmark_loot_roll(c: &mut Criterion) {
    let catalog = create_test_catalog();
    let generator = ItemGenerator::default();
    let profile = LootProfile {
        id: "bandit".to_string(),
        currency_per_level: 3,
        currency_min_pct: 80,
        currency_max_pct: 120,
        min_rolls: 1,
        max_rolls: 3,
        drop_chance_bp: 5_000,
        level_variance: 2,
        templates: vec!["iron-sword".to_string()],
    };
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    c.bench_function("loot_profile_roll", |b| {
        b.iter(|| black_box(profile.roll(black_box(15), &catalog, &generator, &mut rng)));
    });
}

criterion_group!(
    benches,
    benchmark_single_roll,
    benchmark_rarity_sampling,
    benchmark_loot_roll
);
criterion_main!(benches);
