use crate::data::Table;

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Render the first `rows` rows of a table as aligned text
pub fn render_preview(table: &Table, rows: usize) -> String {
    let head = table.head(rows);
    let types: Vec<String> = (0..table.column_count())
        .map(|i| table.column_type(i).to_string())
        .collect();
    let body: Vec<Vec<String>> = head
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

    // Index column first, like a dataframe preview
    let index_width = head.row_count().saturating_sub(1).to_string().len();
    let widths: Vec<usize> = (0..table.column_count())
        .map(|i| {
            body.iter()
                .map(|r| r[i].chars().count())
                .chain([table.headers[i].chars().count(), types[i].chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, "", index_width, &table.headers, &widths);
    push_line(&mut out, "", index_width, &types, &widths);
    for (i, row) in body.iter().enumerate() {
        push_line(&mut out, &i.to_string(), index_width, row, &widths);
    }
    out.push_str(&format!(
        "[{} rows x {} columns]\n",
        table.row_count(),
        table.column_count()
    ));
    out
}

/// One line per column: name and inferred type
pub fn render_columns(table: &Table) -> String {
    let mut out = String::new();
    for (i, name) in table.headers.iter().enumerate() {
        out.push_str(&format!("{}\t{}\n", name, table.column_type(i)));
    }
    out
}

fn push_line(out: &mut String, index: &str, index_width: usize, cells: &[String], widths: &[usize]) {
    out.push_str(&pad(index, index_width));
    for (cell, &width) in cells.iter().zip(widths) {
        out.push_str("  ");
        out.push_str(&pad(cell, width));
    }
    out.truncate(out.trim_end().len());
    out.push('\n');
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    let mut padded = String::with_capacity(width.max(len));
    padded.push_str(s);
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    padded
}
