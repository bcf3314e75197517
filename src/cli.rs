use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Group survey categories and average them per city",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the category groups found in each input
    Groups(GroupsArgs),
    /// List the cities seen across all inputs with their row counts
    Cities(CitiesArgs),
    /// Print one group as a category by city table, or as pie slices for one city
    Show(ShowArgs),
    /// Write the grouped datasets as JSON or YAML
    Export(ExportArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Survey extracts sharing one city set (repeatable, `-` for stdin)
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct CitiesArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Group to display
    #[arg(short = 'g', long = "group")]
    pub group: String,
    /// Restrict output to one city and show each category's share
    #[arg(short = 'c', long = "city")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Serialization format
    #[arg(long, value_enum, default_value = "json")]
    pub format: ExportFormat,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() || !first.is_ascii() {
                return Err("Delimiter must be a single ASCII character".to_string());
            }
            Ok(first as u8)
        }
    }
}
