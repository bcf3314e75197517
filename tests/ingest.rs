mod common;

use common::{BEDROOMS_HEADER, raw_table};
use survey_groups::{aggregate::Aggregator, error::IngestError, layout::CITY_INDEX};

#[test]
fn duplicate_city_rows_are_averaged() {
    let table = raw_table(&[
        BEDROOMS_HEADER,
        &["1", "", "", "Aurora", "10", "4", "3", "2", "1"],
        &["2", "", "", "Aurora", "12", "6", "5", "2", "1"],
    ]);
    let mut aggregator = Aggregator::new();
    let dataset = aggregator.ingest(&table).expect("ingest");

    assert_eq!(aggregator.city_counts().get("Aurora"), Some(2));
    let group = dataset.group("Bedrooms").expect("bedrooms group");
    assert_eq!(group.category("ONE_BED").unwrap().value("Aurora"), Some(5.0));
    assert_eq!(group.category("TWO_BED").unwrap().value("Aurora"), Some(4.0));
    assert_eq!(group.category("END").unwrap().value("Aurora"), Some(1.0));
    assert!(group.category("MED_Bedrooms").is_none());
    assert!(group.category("TOT_Bedrooms").is_none());
}

#[test]
fn shape_group_takes_the_preceding_column() {
    let table = raw_table(&[
        &["ID", "_", "_", "City", "TOT_Pop", "P1", "AREA", "Shape__Area", "Shape__Length"],
        &["1", "", "", "Aurora", "5", "5", "10", "20", "30"],
    ]);
    let mut aggregator = Aggregator::new();
    let dataset = aggregator.ingest(&table).expect("ingest");

    let shape = dataset.group("Shape").expect("shape group");
    assert_eq!(shape.category_at(0).unwrap().name, "AREA");
    assert_eq!(shape.category_at(0).unwrap().value("Aurora"), Some(10.0));
    assert_eq!(shape.category_at(1).unwrap().name, "Shape__Area");
    assert_eq!(shape.category_at(1).unwrap().value("Aurora"), Some(20.0));
    assert_eq!(shape.category_at(2).unwrap().value("Aurora"), Some(30.0));

    let pop = dataset.group("Pop").expect("pop group");
    assert_eq!(pop.category_names(), vec!["P1"]);
}

#[test]
fn finalized_values_match_independent_recount() {
    let table = raw_table(&[
        BEDROOMS_HEADER,
        &["1", "", "", "Aurora", "0", "4", "1.5", "0", "2"],
        &["2", "", "", "Markham", "0", "7", "2.25", "0", "3"],
        &["3", "", "", "Aurora", "0", "6", "0.5", "0", "8"],
        &["4", "", "", "Aurora", "0", "11", "4", "0", "5"],
        &["5", "", "", "Markham", "0", "1", "0.75", "0", "0"],
    ]);
    let mut aggregator = Aggregator::new();
    let dataset = aggregator.ingest(&table).expect("ingest");
    let group = dataset.group("Bedrooms").unwrap();
    let header = table.header().unwrap();

    for city in ["Aurora", "Markham"] {
        let rows = table
            .data_rows()
            .filter(|(_, cells)| cells[CITY_INDEX] == city)
            .collect::<Vec<_>>();
        for category in group.categories() {
            let column = header.iter().position(|h| *h == category.name).unwrap();
            let sum: f64 = rows
                .iter()
                .map(|(_, cells)| cells[column].parse::<f64>().unwrap())
                .sum();
            let expected = sum / rows.len() as f64;
            assert_eq!(category.value(city), Some(expected), "{city} {}", category.name);
        }
    }
}

#[test]
fn shared_counts_divide_every_table_in_a_batch() {
    let housing = raw_table(&[
        BEDROOMS_HEADER,
        &["1", "", "", "Aurora", "0", "4", "0", "0", "0"],
    ]);
    let commute = raw_table(&[
        &["ID", "_", "_", "City", "TOT_Mode", "Car", "Walk", "end"],
        &["1", "", "", "Aurora", "0", "8", "2", "0"],
    ]);
    let mut aggregator = Aggregator::new();
    let datasets = aggregator
        .ingest_all(&[housing, commute])
        .expect("ingest batch");

    assert_eq!(aggregator.city_counts().get("Aurora"), Some(2));
    let one_bed = datasets[0].group("Bedrooms").unwrap().category("ONE_BED").unwrap();
    assert_eq!(one_bed.value("Aurora"), Some(2.0));
    let car = datasets[1].group("Mode").unwrap().category("Car").unwrap();
    assert_eq!(car.value("Aurora"), Some(4.0));
}

#[test]
fn counts_persist_across_ingest_calls() {
    let first = raw_table(&[BEDROOMS_HEADER, &["1", "", "", "Aurora", "0", "4", "0", "0", "0"]]);
    let second = raw_table(&[BEDROOMS_HEADER, &["1", "", "", "Vaughan", "0", "9", "0", "0", "0"]]);
    let mut aggregator = Aggregator::new();
    aggregator.ingest(&first).unwrap();
    let dataset = aggregator.ingest(&second).unwrap();

    assert_eq!(aggregator.cities(), vec!["Aurora", "Vaughan"]);
    let one_bed = dataset.group("Bedrooms").unwrap().category("ONE_BED").unwrap();
    assert_eq!(one_bed.value("Vaughan"), Some(9.0));
    assert_eq!(one_bed.value("Aurora"), None);
}

#[test]
fn non_numeric_cell_rejects_whole_table() {
    let table = raw_table(&[
        BEDROOMS_HEADER,
        &["1", "", "", "Aurora", "0", "4", "0", "0", "0"],
        &["2", "", "", "Aurora", "0", "4", "x", "0", "0"],
    ]);
    let mut aggregator = Aggregator::new();
    let err = aggregator.ingest(&table).unwrap_err();
    assert_eq!(
        err,
        IngestError::MalformedValue {
            row: 2,
            column: "TWO_BED".to_string(),
            value: "x".to_string()
        }
    );
    assert!(aggregator.cities().is_empty());
}

#[test]
fn header_without_groups_is_rejected() {
    let table = raw_table(&[
        &["ID", "_", "_", "City", "ONE_BED", "TWO_BED"],
        &["1", "", "", "Aurora", "1", "2"],
    ]);
    let err = Aggregator::new().ingest(&table).unwrap_err();
    assert!(matches!(err, IngestError::MalformedHeader { column: 4, .. }));
}

#[test]
fn medians_and_totals_only_locate_groups() {
    let table = raw_table(&[
        &[
            "ID", "_", "_", "City", "TOT_Rent", "Low", "High", "MED_Rent", "TOT_Cost", "Cheap",
            "end",
        ],
        &["1", "", "", "Aurora", "999", "1", "2", "999", "999", "3", "4"],
    ]);
    let dataset = Aggregator::new().ingest(&table).expect("ingest");

    let rent = dataset.group("Rent").unwrap();
    assert_eq!(rent.category_names(), vec!["Low", "High"]);
    let cost = dataset.group("Cost").unwrap();
    assert_eq!(cost.category_names(), vec!["Cheap", "end"]);
    let all_values = dataset
        .groups()
        .iter()
        .flat_map(|g| g.categories())
        .filter_map(|c| c.value("Aurora"))
        .collect::<Vec<_>>();
    assert!(all_values.iter().all(|v| *v != 999.0));
    assert_eq!(all_values, vec![1.0, 2.0, 3.0, 4.0]);
}
