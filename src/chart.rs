//! Views of finalised datasets shaped for charting.

use serde::Serialize;

use crate::{
    dataset::{Dataset, Group, find_group},
    error::ViewError,
};

/// One wedge of a per-city pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub category: String,
    pub value: f64,
    /// Share of the group total in percent; zero when the total is zero.
    pub share: f64,
}

/// Category values of `group` for a single `city`, in category order.
pub fn pie_slices(
    datasets: &[Dataset],
    group: &str,
    city: &str,
) -> Result<Vec<Slice>, ViewError> {
    let group =
        find_group(datasets, group).ok_or_else(|| ViewError::UnknownGroup(group.to_string()))?;
    let values = group
        .categories()
        .iter()
        .map(|category| (category.name.as_str(), category.value_for(city)))
        .collect::<Vec<_>>();
    let total: f64 = values.iter().map(|(_, value)| value).sum();
    Ok(values
        .into_iter()
        .map(|(category, value)| Slice {
            category: category.to_string(),
            value,
            share: if total == 0.0 { 0.0 } else { value / total * 100.0 },
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub category: String,
    pub values: Vec<f64>,
}

/// One row per category, one value per entry of `cities`.
pub fn group_matrix(group: &Group, cities: &[String]) -> Vec<MatrixRow> {
    group
        .categories()
        .iter()
        .map(|category| MatrixRow {
            category: category.name.clone(),
            values: cities.iter().map(|city| category.value_for(city)).collect(),
        })
        .collect()
}
