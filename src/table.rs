//! Plain-text tables for terminal output.
//!
//! The first column is left-aligned (labels), every other column is
//! right-aligned (numbers).

use itertools::Itertools;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    let separator = widths.iter().map(|w| "-".repeat((*w).max(1))).collect::<Vec<_>>();
    std::iter::once(headers)
        .chain(std::iter::once(separator.as_slice()))
        .chain(rows.iter().map(Vec::as_slice))
        .map(|cells| format_row(cells, &widths))
        .map(|line| line + "\n")
        .collect()
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

/// Whole numbers print without decimals, everything else with two.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (cell, width))| {
            let cell = cell.replace(['\n', '\r', '\t'], " ");
            let padding = " ".repeat(width.saturating_sub(display_width(&cell)));
            if idx == 0 {
                format!("{cell}{padding}")
            } else {
                format!("{padding}{cell}")
            }
        })
        .join("  ")
        .trim_end()
        .to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}
