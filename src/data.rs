use anyhow::{anyhow, bail, Result};
use std::cmp::Ordering;
use std::fmt;

use crate::spec::SortDirection;

/// A single table cell after type inference
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Infer a cell from raw text: blank is empty, anything parsing as f64 is numeric
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_nan() => Cell::Empty,
            Ok(n) => Cell::Number(n),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Empty => Ok(()),
        }
    }
}

/// Integral values print without a fractional part
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Numeric,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Numeric => write!(f, "numeric"),
            ColumnType::Text => write!(f, "text"),
        }
    }
}

/// In-memory table with named, heterogeneously typed columns
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table; every row is padded with empty cells or truncated to the header width
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn from_strings(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|raw| Cell::infer(raw)).collect())
            .collect();
        Self::new(headers, rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("Column '{}' not found", name))
    }

    /// A column is numeric when it has at least one number and no text
    pub fn column_type(&self, index: usize) -> ColumnType {
        let mut saw_number = false;
        for row in &self.rows {
            match &row[index] {
                Cell::Text(_) => return ColumnType::Text,
                Cell::Number(_) => saw_number = true,
                Cell::Empty => {}
            }
        }
        if saw_number {
            ColumnType::Numeric
        } else {
            ColumnType::Text
        }
    }

    /// Names of the numeric columns, in table order
    pub fn numeric_columns(&self) -> Vec<String> {
        (0..self.column_count())
            .filter(|&i| self.column_type(i) == ColumnType::Numeric)
            .map(|i| self.headers[i].clone())
            .collect()
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    pub fn head(&self, n: usize) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Stable sort by a numeric column; empty cells always go last
    pub fn sorted_by(&self, column: &str, direction: SortDirection) -> Result<Table> {
        let index = self.column_index(column)?;
        if self.column_type(index) != ColumnType::Numeric {
            bail!("Cannot sort by non-numeric column '{}'", column);
        }

        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| compare_for_sort(&a[index], &b[index], direction));

        Ok(Table {
            headers: self.headers.clone(),
            rows,
        })
    }
}

fn compare_for_sort(a: &Cell, b: &Cell, direction: SortDirection) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> Table {
        Table::from_strings(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_cell_infer() {
        assert_eq!(Cell::infer("12"), Cell::Number(12.0));
        assert_eq!(Cell::infer(" -3.5 "), Cell::Number(-3.5));
        assert_eq!(Cell::infer(""), Cell::Empty);
        assert_eq!(Cell::infer("  "), Cell::Empty);
        assert_eq!(Cell::infer("NaN"), Cell::Empty);
        assert_eq!(Cell::infer("north"), Cell::Text("north".to_string()));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-4.0), "-4");
    }

    #[test]
    fn test_rows_padded_to_header_width() {
        let table = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::Number(1.0)]],
        );
        assert_eq!(table.rows[0], vec![Cell::Number(1.0), Cell::Empty]);
    }

    #[test]
    fn test_column_types() {
        let table = make_table(
            vec!["name", "score", "blank", "mixed"],
            vec![vec!["a", "1", "", "1"], vec!["b", "", "", "x"]],
        );
        assert_eq!(table.column_type(0), ColumnType::Text);
        assert_eq!(table.column_type(1), ColumnType::Numeric);
        assert_eq!(table.column_type(2), ColumnType::Text);
        assert_eq!(table.column_type(3), ColumnType::Text);
        assert_eq!(table.numeric_columns(), vec!["score".to_string()]);
    }

    #[test]
    fn test_column_index_not_found() {
        let table = make_table(vec!["a"], vec![vec!["1"]]);
        let err = table.column_index("b").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_head() {
        let table = make_table(vec!["a"], vec![vec!["1"], vec!["2"], vec!["3"]]);
        assert_eq!(table.head(2).row_count(), 2);
        assert_eq!(table.head(10).row_count(), 3);
    }

    #[test]
    fn test_sorted_by_directions() {
        let table = make_table(
            vec!["k", "v"],
            vec![vec!["a", "2"], vec!["b", ""], vec!["c", "1"], vec!["d", "3"]],
        );

        let asc = table.sorted_by("v", SortDirection::Ascending).unwrap();
        let keys: Vec<String> = asc.column(0).map(|c| c.to_string()).collect();
        assert_eq!(keys, vec!["c", "a", "d", "b"]);

        let desc = table.sorted_by("v", SortDirection::Descending).unwrap();
        let keys: Vec<String> = desc.column(0).map(|c| c.to_string()).collect();
        assert_eq!(keys, vec!["d", "a", "c", "b"]);

        // source untouched
        assert_eq!(table.rows[0][0], Cell::Text("a".to_string()));
    }

    #[test]
    fn test_sorted_by_is_stable() {
        let table = make_table(
            vec!["k", "v"],
            vec![vec!["a", "1"], vec!["b", "1"], vec!["c", "0"]],
        );
        let asc = table.sorted_by("v", SortDirection::Ascending).unwrap();
        let keys: Vec<String> = asc.column(0).map(|c| c.to_string()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_sorted_by_text_column_fails() {
        let table = make_table(vec!["k"], vec![vec!["a"]]);
        assert!(table.sorted_by("k", SortDirection::Ascending).is_err());
    }
}
