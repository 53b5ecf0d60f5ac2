// Turns a table and a chart spec into plot-ready series

use crate::data::{format_number, Cell, ColumnType, Table};
use crate::spec::{ChartColumns, ChartKind, ChartSpec, SortDirection};
use anyhow::{bail, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// How x values map onto the horizontal axis
#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    /// x holds category indices into these labels
    Categorical(Vec<String>),
    Continuous,
}

/// Data for a bar, line or scatter chart
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSeries {
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: XAxis,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl AxisSeries {
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x.iter().copied().zip(self.y.iter().copied()).collect()
    }

    /// Label for an x position: the category name or the formatted number
    pub fn x_name(&self, x: f64) -> String {
        match &self.x_axis {
            XAxis::Categorical(labels) => labels
                .get(x.round() as usize)
                .cloned()
                .unwrap_or_default(),
            XAxis::Continuous => format_number(x),
        }
    }
}

/// Aggregated wedges for a pie chart
#[derive(Debug, Clone, PartialEq)]
pub struct PieSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl PieSeries {
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn fractions(&self) -> Vec<f64> {
        let total = self.total();
        self.values.iter().map(|v| v / total).collect()
    }

    /// Wedge labels in the `%1.1f%%` style
    pub fn percentage_labels(&self) -> Vec<String> {
        self.fractions()
            .iter()
            .map(|f| format!("{:.1}%", f * 100.0))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreparedChart {
    Axes(AxisSeries),
    Pie(PieSeries),
}

/// Prepare the plotted data; assumes `spec.validate(table)` has passed
pub fn prepare(table: &Table, spec: &ChartSpec) -> Result<PreparedChart> {
    match &spec.columns {
        ChartColumns::Axes { x, y } => {
            let sorted;
            let source = match spec.sort {
                Some(direction) => {
                    sorted = table.sorted_by(y, direction)?;
                    &sorted
                }
                None => table,
            };
            prepare_axes(source, spec.kind, x, y).map(PreparedChart::Axes)
        }
        ChartColumns::Slices { category, value } => {
            prepare_pie(table, category, value, spec.sort).map(PreparedChart::Pie)
        }
    }
}

/// Build x/y series in row order; sorting has already been applied to `table`
pub fn prepare_axes(table: &Table, kind: ChartKind, x_col: &str, y_col: &str) -> Result<AxisSeries> {
    let x_idx = table.column_index(x_col)?;
    let y_idx = table.column_index(y_col)?;
    let x_numeric = table.column_type(x_idx) == ColumnType::Numeric;

    let pairs: Vec<(&Cell, f64)> = table
        .rows
        .iter()
        .filter(|row| !row[x_idx].is_empty())
        .filter_map(|row| row[y_idx].as_number().map(|y| (&row[x_idx], y)))
        .collect();

    if pairs.is_empty() {
        bail!("No data to plot: columns '{}' and '{}' have no complete rows", x_col, y_col);
    }

    let (x_axis, x, y) = match (kind, x_numeric) {
        (ChartKind::Bar, true) => {
            // numeric levels are drawn as categories in ascending order
            let mut numeric: Vec<(f64, f64)> = pairs
                .iter()
                .filter_map(|(c, y)| c.as_number().map(|x| (x, *y)))
                .collect();
            numeric.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
            let (levels, means) = mean_by_consecutive_x(&numeric);
            let labels = levels.iter().map(|v| format_number(*v)).collect();
            (XAxis::Categorical(labels), index_positions(means.len()), means)
        }
        (ChartKind::Bar, false) => {
            let (labels, means) = mean_by_first_appearance(&pairs);
            (XAxis::Categorical(labels), index_positions(means.len()), means)
        }
        (ChartKind::Line, true) => {
            let mut numeric: Vec<(f64, f64)> = pairs
                .iter()
                .filter_map(|(c, y)| c.as_number().map(|x| (x, *y)))
                .collect();
            numeric.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
            let (xs, means) = mean_by_consecutive_x(&numeric);
            (XAxis::Continuous, xs, means)
        }
        (ChartKind::Line, false) => {
            let (labels, means) = mean_by_first_appearance(&pairs);
            (XAxis::Categorical(labels), index_positions(means.len()), means)
        }
        (_, true) => {
            let (xs, ys): (Vec<f64>, Vec<f64>) = pairs
                .iter()
                .filter_map(|(c, y)| c.as_number().map(|x| (x, *y)))
                .unzip();
            (XAxis::Continuous, xs, ys)
        }
        (_, false) => {
            let mut positions: HashMap<String, usize> = HashMap::new();
            let mut labels = Vec::new();
            let mut xs = Vec::with_capacity(pairs.len());
            let mut ys = Vec::with_capacity(pairs.len());
            for (cell, y) in &pairs {
                let key = cell.to_string();
                let pos = *positions.entry(key.clone()).or_insert_with(|| {
                    labels.push(key);
                    labels.len() - 1
                });
                xs.push(pos as f64);
                ys.push(*y);
            }
            (XAxis::Categorical(labels), xs, ys)
        }
    };

    if let Some(bad) = x.iter().chain(y.iter()).find(|v| !v.is_finite()) {
        bail!(
            "Axis limits cannot be NaN or Inf: '{}' / '{}' contain {}",
            x_col,
            y_col,
            bad
        );
    }

    debug!(%kind, points = x.len(), categorical = matches!(x_axis, XAxis::Categorical(_)), "prepared axis series");

    Ok(AxisSeries {
        kind,
        x_label: x_col.to_string(),
        y_label: y_col.to_string(),
        x_axis,
        x,
        y,
    })
}

/// Sum `value_col` per category, keys in ascending order, then optionally sort by value
pub fn prepare_pie(
    table: &Table,
    category_col: &str,
    value_col: &str,
    sort: Option<SortDirection>,
) -> Result<PieSeries> {
    let cat_idx = table.column_index(category_col)?;
    let val_idx = table.column_index(value_col)?;
    let numeric_keys = table.column_type(cat_idx) == ColumnType::Numeric;

    let mut sums: HashMap<String, (Option<f64>, f64)> = HashMap::new();
    for row in &table.rows {
        let key_cell = &row[cat_idx];
        if key_cell.is_empty() {
            continue;
        }
        let entry = sums
            .entry(key_cell.to_string())
            .or_insert((key_cell.as_number(), 0.0));
        if let Some(v) = row[val_idx].as_number() {
            entry.1 += v;
        }
    }

    if sums.is_empty() {
        bail!("No data to plot: column '{}' has no categories", category_col);
    }

    let mut groups: Vec<(String, Option<f64>, f64)> =
        sums.into_iter().map(|(k, (n, sum))| (k, n, sum)).collect();
    groups.sort_by(|a, b| {
        if numeric_keys {
            a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal)
        } else {
            a.0.cmp(&b.0)
        }
    });

    if let Some(direction) = sort {
        groups.sort_by(|a, b| {
            let ord = a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    if let Some((label, _, v)) = groups.iter().find(|(_, _, v)| !v.is_finite()) {
        bail!("Pie wedge '{}' has a non-finite value {}", label, v);
    }
    if let Some((label, _, v)) = groups.iter().find(|(_, _, v)| *v < 0.0) {
        bail!("Pie wedges must be non-negative, but '{}' sums to {}", label, format_number(*v));
    }

    let (labels, values): (Vec<String>, Vec<f64>) =
        groups.into_iter().map(|(k, _, v)| (k, v)).unzip();
    let series = PieSeries { labels, values };
    if !series.total().is_finite() {
        bail!("Pie chart values in '{}' have a non-finite total", value_col);
    }
    if series.total() <= 0.0 {
        bail!("Pie chart values in '{}' sum to zero", value_col);
    }

    debug!(wedges = series.labels.len(), total = series.total(), "prepared pie series");
    Ok(series)
}

fn index_positions(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

/// Mean of y per category, categories in order of first appearance
fn mean_by_first_appearance(pairs: &[(&Cell, f64)]) -> (Vec<String>, Vec<f64>) {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut labels: Vec<String> = Vec::new();
    let mut sums: Vec<(f64, usize)> = Vec::new();

    for (cell, y) in pairs {
        let key = cell.to_string();
        let i = *index.entry(key.clone()).or_insert_with(|| {
            labels.push(key);
            sums.push((0.0, 0));
            labels.len() - 1
        });
        sums[i].0 += y;
        sums[i].1 += 1;
    }

    let means = sums.iter().map(|(s, n)| s / *n as f64).collect();
    (labels, means)
}

/// Mean of y for runs of equal x; input must be sorted by x
fn mean_by_consecutive_x(sorted: &[(f64, f64)]) -> (Vec<f64>, Vec<f64>) {
    let mut xs: Vec<f64> = Vec::new();
    let mut means: Vec<f64> = Vec::new();
    let mut count = 0usize;

    for &(x, y) in sorted {
        if xs.last() == Some(&x) {
            count += 1;
            if let Some(last) = means.last_mut() {
                // running mean
                *last += (y - *last) / count as f64;
            }
        } else {
            xs.push(x);
            means.push(y);
            count = 1;
        }
    }
    (xs, means)
}
