//! Loading survey extracts from delimited text and writing command output.
//!
//! - **Delimiter resolution**: `.tsv` inputs default to tab, everything else to
//!   comma, unless overridden.
//! - **Encoding**: cells are decoded through `encoding_rs`, defaulting to UTF-8.
//! - **stdin/stdout**: the `-` path reads standard input; a missing or `-`
//!   output path writes to standard output.
//!
//! The whole file, header included, is read into a [`RawTable`]. Ragged rows
//! are accepted here and judged by the aggregator.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::dataset::RawTable;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'")),
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_dash(path) {
        return Ok(Box::new(std::io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    Ok(Box::new(BufReader::new(file)))
}

pub fn decode_cell(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(anyhow!("Failed to decode text with encoding {}", encoding.name()));
    }
    Ok(text.into_owned())
}

pub fn read_raw_table<R: Read>(
    reader: R,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for (idx, record) in csv_reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {idx}"))?;
        let cells = record
            .iter()
            .map(|field| decode_cell(field, encoding))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Decoding row {idx}"))?;
        rows.push(cells);
    }
    Ok(RawTable::new(rows))
}

/// Reads `path` into a [`RawTable`] labelled with the file name.
pub fn load_raw_table(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Result<RawTable> {
    let delimiter = resolve_input_delimiter(path, delimiter);
    let table = read_raw_table(open_input(path)?, delimiter, encoding)
        .with_context(|| format!("Loading {path:?}"))?;
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdin".to_string());
    debug!("Loaded {} data row(s) from {label}", table.row_count());
    Ok(table.with_source(label))
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) if !is_dash(p) => Ok(Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        ))),
        _ => Ok(Box::new(std::io::stdout())),
    }
}
