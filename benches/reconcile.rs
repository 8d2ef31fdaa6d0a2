use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tally::core::{storage::BudgetStorage, BudgetService};
use tally::domain::{Budget, Category, Section};
use tally::storage::{JsonStorage, StoragePaths};
use tempfile::tempdir;
use uuid::Uuid;

fn build_sample_budget(sections: usize, per_section: usize) -> Budget {
    let mut budget = Budget::new(Uuid::new_v4(), "Benchmark");
    budget.income = Some(1_000_000.0);
    for s in 0..sections {
        let mut section = Section::new(format!("Section {s}"));
        for c in 0..per_section {
            let amount = 10.0 + ((s * per_section + c) % 250) as f64;
            section.categories.push(
                Category::new(format!("Category {s}-{c}"))
                    .with_budgeted(amount)
                    .with_spent(amount * 0.8),
            );
        }
        budget.sections.push(section);
    }
    budget
}

fn bench_reconcile(c: &mut Criterion) {
    let budget = build_sample_budget(black_box(50), black_box(200));

    c.bench_function("reconcile_10k_categories", |b| {
        b.iter(|| {
            let totals = BudgetService::reconcile(budget.categories(), budget.total_budget_amount());
            black_box(totals);
        })
    });

    c.bench_function("apply_reconciliation_10k", |b| {
        b.iter_batched(
            || budget.clone(),
            |mut copy| {
                black_box(BudgetService::apply_reconciliation(&mut copy));
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_budget_io(c: &mut Criterion) {
    let budget = build_sample_budget(black_box(50), black_box(200));
    let dir = tempdir().expect("tempdir");
    let storage = JsonStorage::with_retention(StoragePaths::under(dir.path()), 1).expect("storage");

    c.bench_function("budget_save_10k", |b| {
        b.iter(|| storage.save_budget(&budget).expect("save budget"))
    });

    c.bench_function("budget_load_10k", |b| {
        b.iter(|| {
            let loaded = storage.find_budget(budget.id).expect("load budget");
            black_box(loaded);
        })
    });
}

criterion_group!(benches, bench_reconcile, bench_budget_io);
criterion_main!(benches);
