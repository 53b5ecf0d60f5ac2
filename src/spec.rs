// Chart specification: the user's choices for one render

use crate::data::{ColumnType, Table};
use crate::RenderOptions;
use anyhow::{anyhow, bail, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    #[serde(alias = "point")]
    Scatter,
    Pie,
}

impl ChartKind {
    pub fn uses_axes(self) -> bool {
        !matches!(self, ChartKind::Pie)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
            ChartKind::Pie => "pie",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ChartKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            "scatter" | "point" => Ok(ChartKind::Scatter),
            "pie" => Ok(ChartKind::Pie),
            other => bail!("Unknown chart kind '{}' (expected bar, line, scatter or pie)", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

impl FromStr for SortDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => bail!("Unknown sort direction '{}' (expected asc or desc)", other),
        }
    }
}

/// Column mapping; its shape depends on the chart kind
#[derive(Debug, Clone, PartialEq)]
pub enum ChartColumns {
    Axes { x: String, y: String },
    Slices { category: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub columns: ChartColumns,
    pub sort: Option<SortDirection>,
    pub title: Option<String>,
}

impl ChartSpec {
    pub fn axes(kind: ChartKind, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            kind,
            columns: ChartColumns::Axes {
                x: x.into(),
                y: y.into(),
            },
            sort: None,
            title: None,
        }
    }

    pub fn pie(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: ChartKind::Pie,
            columns: ChartColumns::Slices {
                category: category.into(),
                value: value.into(),
            },
            sort: None,
            title: None,
        }
    }

    pub fn with_sort(mut self, sort: Option<SortDirection>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title derived from the selected columns
    pub fn default_title(&self) -> String {
        match &self.columns {
            ChartColumns::Axes { x, y } => format!("{} vs {}", y, x),
            ChartColumns::Slices { category, value } => format!("{} by {}", value, category),
        }
    }

    pub fn title(&self) -> String {
        match &self.title {
            Some(t) if !t.trim().is_empty() => t.clone(),
            _ => self.default_title(),
        }
    }

    /// The column holding the plotted (numeric) values
    pub fn value_column(&self) -> &str {
        match &self.columns {
            ChartColumns::Axes { y, .. } => y,
            ChartColumns::Slices { value, .. } => value,
        }
    }

    /// Check the spec against the table it will be drawn from
    pub fn validate(&self, table: &Table) -> Result<()> {
        let (label_col, value_col) = match (&self.columns, self.kind.uses_axes()) {
            (ChartColumns::Axes { x, y }, true) => (x, y),
            (ChartColumns::Slices { category, value }, false) => (category, value),
            (ChartColumns::Axes { .. }, false) => {
                bail!("Pie charts need category and value columns, not x/y")
            }
            (ChartColumns::Slices { .. }, true) => {
                bail!("{} charts need x and y columns, not category/value", self.kind)
            }
        };

        table.column_index(label_col)?;
        let value_idx = table.column_index(value_col)?;
        if table.column_type(value_idx) != ColumnType::Numeric {
            bail!(
                "Column '{}' is not numeric (numeric columns: {})",
                value_col,
                table.numeric_columns().join(", ")
            );
        }
        Ok(())
    }
}

/// Flat, serde-friendly form of a chart spec as read from a JSON request file
#[derive(Debug, Clone, Deserialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub sort: Option<SortDirection>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub render: RenderOptions,
}

impl ChartRequest {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn into_spec(self) -> Result<ChartSpec> {
        let spec = if self.kind.uses_axes() {
            let x = self.x.ok_or_else(|| anyhow!("Missing field 'x' for {} chart", self.kind))?;
            let y = self.y.ok_or_else(|| anyhow!("Missing field 'y' for {} chart", self.kind))?;
            ChartSpec::axes(self.kind, x, y)
        } else {
            let category = self
                .category
                .ok_or_else(|| anyhow!("Missing field 'category' for pie chart"))?;
            let value = self
                .value
                .ok_or_else(|| anyhow!("Missing field 'value' for pie chart"))?;
            ChartSpec::pie(category, value)
        };

        let spec = spec.with_sort(self.sort);
        Ok(match self.title {
            Some(title) => spec.with_title(title),
            None => spec,
        })
    }
}
