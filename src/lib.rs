pub mod aggregate;
pub mod category;
pub mod chart;
pub mod cities;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod header;
pub mod io_utils;
pub mod layout;
pub mod table;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::{
    aggregate::Aggregator,
    cli::{Cli, Commands, ExportArgs, ExportFormat, InputArgs, ShowArgs},
    dataset::{Dataset, RawTable, find_group},
    error::ViewError,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("survey_groups", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Groups(args) => handle_groups(&args.input),
        Commands::Cities(args) => handle_cities(&args.input),
        Commands::Show(args) => handle_show(&args),
        Commands::Export(args) => handle_export(&args),
    }
}

/// Loads every input and ingests them as one batch.
///
/// Any load or ingestion failure aborts before a dataset is returned.
pub fn load_datasets(args: &InputArgs) -> Result<(Aggregator, Vec<Dataset>)> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let tables = args
        .inputs
        .iter()
        .map(|path| io_utils::load_raw_table(path, args.delimiter, encoding))
        .collect::<Result<Vec<RawTable>>>()?;
    let mut aggregator = Aggregator::new();
    let datasets = aggregator
        .ingest_all(&tables)
        .with_context(|| format!("Ingesting {:?}", args.inputs))?;
    Ok((aggregator, datasets))
}

fn handle_groups(args: &InputArgs) -> Result<()> {
    let (_, datasets) = load_datasets(args)?;
    let mut rows = Vec::new();
    for dataset in &datasets {
        let source = dataset.source.clone().unwrap_or_default();
        for group in dataset.groups() {
            rows.push(vec![
                group.name.clone(),
                source.clone(),
                group.len().to_string(),
            ]);
        }
    }
    let headers = vec![
        "group".to_string(),
        "source".to_string(),
        "categories".to_string(),
    ];
    table::print_table(&headers, &rows);
    info!("Listed {} group(s)", rows.len());
    Ok(())
}

fn handle_cities(args: &InputArgs) -> Result<()> {
    let (aggregator, _) = load_datasets(args)?;
    let rows = aggregator
        .city_counts()
        .iter()
        .map(|(city, count)| vec![city.to_string(), count.to_string()])
        .collect::<Vec<_>>();
    let headers = vec!["city".to_string(), "rows".to_string()];
    table::print_table(&headers, &rows);
    info!("Listed {} city(ies)", rows.len());
    Ok(())
}

fn handle_show(args: &ShowArgs) -> Result<()> {
    let (aggregator, datasets) = load_datasets(&args.input)?;
    if let Some(city) = &args.city {
        if aggregator.city_counts().get(city).is_none() {
            return Err(ViewError::UnknownCity(city.clone()).into());
        }
        let slices = chart::pie_slices(&datasets, &args.group, city)?;
        let rows = slices
            .iter()
            .map(|slice| {
                vec![
                    slice.category.clone(),
                    table::format_number(slice.value),
                    format!("{:.2}%", slice.share),
                ]
            })
            .collect::<Vec<_>>();
        let headers = vec!["category".to_string(), city.clone(), "share".to_string()];
        table::print_table(&headers, &rows);
        return Ok(());
    }

    let group = find_group(&datasets, &args.group)
        .ok_or_else(|| ViewError::UnknownGroup(args.group.clone()))?;
    let cities = aggregator.cities();
    debug!("Rendering group '{}' for {} city(ies)", group.name, cities.len());
    let rows = chart::group_matrix(group, &cities)
        .into_iter()
        .map(|row| {
            std::iter::once(row.category)
                .chain(row.values.into_iter().map(table::format_number))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let headers = std::iter::once("category".to_string())
        .chain(cities)
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    Ok(())
}

#[derive(Debug, Serialize)]
struct Export<'a> {
    cities: &'a cities::CityCounts,
    datasets: &'a [Dataset],
}

fn handle_export(args: &ExportArgs) -> Result<()> {
    let (aggregator, datasets) = load_datasets(&args.input)?;
    let document = Export {
        cities: aggregator.city_counts(),
        datasets: &datasets,
    };
    let mut writer = io_utils::open_output(args.output.as_deref())?;
    match args.format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &document).context("Writing JSON export")?;
            writeln!(writer)?;
        }
        ExportFormat::Yaml => {
            serde_yaml::to_writer(&mut writer, &document).context("Writing YAML export")?;
        }
    }
    writer.flush()?;
    if let Some(path) = &args.output {
        info!(
            "Exported {} dataset(s) to {:?}",
            datasets.len(),
            path
        );
    }
    Ok(())
}
