use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use survey_groups::{aggregate::Aggregator, dataset::RawTable};

const CITIES: &[&str] = &["Aurora", "Markham", "Newmarket", "Richmond Hill", "Vaughan"];

/// Wide extract with `groups` total-led groups of `members` categories each.
fn generate_table(rows: usize, groups: usize, members: usize) -> RawTable {
    let mut header = ["ID", "Name", "Code", "City"]
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>();
    for group in 0..groups {
        header.push(format!("TOT_Group{group}"));
        for member in 0..members {
            header.push(format!("G{group}_C{member}"));
        }
        header.push(format!("MED_Group{group}"));
    }
    header.push("AREA".to_string());
    header.push("Shape__Area".to_string());
    header.push("Shape__Length".to_string());

    let mut table = vec![header.clone()];
    for row in 0..rows {
        let mut cells = vec![
            row.to_string(),
            String::new(),
            String::new(),
            CITIES[row % CITIES.len()].to_string(),
        ];
        cells.extend((4..header.len()).map(|col| ((row * 7 + col) % 100).to_string()));
        table.push(cells);
    }
    RawTable::new(table)
}

fn bench_ingest(c: &mut Criterion) {
    let table = generate_table(5_000, 40, 8);
    let mut group = c.benchmark_group("ingest");

    group.bench_function("wide_table", |b| {
        b.iter_batched(
            Aggregator::new,
            |mut aggregator| {
                aggregator.ingest(&table).expect("ingest");
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_ingest);
criterion_main!(benches);
