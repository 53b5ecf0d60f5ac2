// File intake: extension gate plus CSV and spreadsheet readers

use crate::data::{Cell, Table};
use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Spreadsheet,
}

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

impl FileKind {
    /// Pick a reader from the file extension alone
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Ok(FileKind::Csv),
            Some("xlsx") | Some("xls") => Ok(FileKind::Spreadsheet),
            Some(other) => bail!(
                "Unsupported file type '.{}' (expected one of: {})",
                other,
                SUPPORTED_EXTENSIONS.join(", ")
            ),
            None => bail!(
                "Unsupported file type: '{}' has no extension (expected one of: {})",
                path.display(),
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        }
    }
}

/// Read a table from a file on disk
pub fn read_table(path: &Path) -> Result<Table> {
    // Gate before touching the file
    let kind = FileKind::from_path(path)?;
    let bytes = fs::read(path).with_context(|| format!("Failed to read '{}'", path.display()))?;
    read_kind(kind, bytes)
}

/// Read a table from an in-memory upload, dispatching on the file name
pub fn read_table_from_bytes(name: &str, bytes: Vec<u8>) -> Result<Table> {
    let kind = FileKind::from_path(Path::new(name))?;
    read_kind(kind, bytes)
}

fn read_kind(kind: FileKind, bytes: Vec<u8>) -> Result<Table> {
    debug!(?kind, size = bytes.len(), "dispatching file to reader");
    let table = match kind {
        FileKind::Csv => read_csv(&bytes)?,
        FileKind::Spreadsheet => read_spreadsheet(bytes)?,
    };
    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded table"
    );
    Ok(table)
}

/// Parse CSV bytes; the first record is the header
pub fn read_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .enumerate()
        .map(|(i, h)| header_name(i, h.trim_start_matches('\u{feff}')))
        .collect();

    if headers.is_empty() {
        bail!("CSV file has no columns");
    }

    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse CSV row {}", row_idx + 1))?;
        rows.push(record.iter().map(Cell::infer).collect());
    }

    if rows.is_empty() {
        bail!("CSV file must contain at least one data row");
    }

    Ok(Table::new(headers, rows))
}

/// Parse XLSX/XLS bytes; reads the first worksheet, first row is the header
pub fn read_spreadsheet(bytes: Vec<u8>) -> Result<Table> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).context("Failed to open spreadsheet")?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Spreadsheet contains no worksheets"))?
        .context("Failed to read first worksheet")?;

    let mut sheet_rows = range.rows();
    let header_row = sheet_rows
        .next()
        .ok_or_else(|| anyhow!("Worksheet is empty"))?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| header_name(i, &cell.to_string()))
        .collect();

    let rows: Vec<Vec<Cell>> = sheet_rows
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    if rows.is_empty() {
        bail!("Worksheet must contain at least one data row");
    }

    Ok(Table::new(headers, rows))
}

fn spreadsheet_cell(cell: &Data) -> Cell {
    match cell {
        Data::Float(f) if f.is_nan() => Cell::Empty,
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::String(s) => Cell::infer(s),
        Data::DateTime(dt) => excel_date_cell(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Empty | Data::Error(_) => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

/// Date cells read as calendar text; time-of-day is kept only when present
fn excel_date_cell(dt: &ExcelDateTime) -> Cell {
    if dt.is_duration() {
        return match dt.as_duration() {
            Some(d) => Cell::Text(format!(
                "{}:{:02}:{:02}",
                d.num_hours(),
                d.num_minutes() % 60,
                d.num_seconds() % 60
            )),
            None => Cell::Number(dt.as_f64()),
        };
    }
    match dt.as_datetime() {
        Some(t) if t.format("%H:%M:%S").to_string() == "00:00:00" => {
            Cell::Text(t.format("%Y-%m-%d").to_string())
        }
        Some(t) => Cell::Text(t.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => Cell::Number(dt.as_f64()),
    }
}

/// Blank headers get a positional placeholder name
fn header_name(index: usize, raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("Unnamed: {}", index)
    } else {
        trimmed.to_string()
    }
}
