use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tablechart::intake::{self, FileKind};
use tablechart::prepare::{self, PreparedChart, XAxis};
use tablechart::runtime::render_chart;
use tablechart::spec::{ChartKind, ChartSpec, SortDirection};
use tablechart::RenderOptions;

/// Run the tablechart binary; Ok(stdout) on success, Err(stderr) otherwise
fn run_tablechart(args: &[&str]) -> Result<Vec<u8>, String> {
    let output = Command::new(env!("CARGO_BIN_EXE_tablechart"))
        .args(args)
        .output()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

fn small() -> RenderOptions {
    RenderOptions::default().with_dpi(30)
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tablechart-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}

#[test]
fn test_end_to_end_bar_chart_stdout() {
    let result = run_tablechart(&[
        "test/sales.csv", "--kind", "bar", "-x", "region", "-y", "revenue",
        "--stdout", "--dpi", "30",
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()), "Output is not a valid PNG");
}

#[test]
fn test_end_to_end_pie_from_expression() {
    let result = run_tablechart(&[
        "test/pie.csv",
        "--spec",
        r#"pie(category: category, value: value) | sort(desc) | labs(title: "Split")"#,
        "--stdout",
        "--dpi",
        "30",
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()));
}

#[test]
fn test_end_to_end_download_named_after_title() {
    let dir = scratch_dir("download");
    let dir_str = dir.to_str().unwrap();
    let result = run_tablechart(&[
        "test/timeseries.csv", "--kind", "line", "-x", "day", "-y", "temperature",
        "--title", "Week 12 temperatures", "--output", dir_str, "--dpi", "30",
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());

    let expected = dir.join("Week 12 temperatures.png");
    let bytes = fs::read(&expected).expect("PNG not written under the title name");
    assert!(is_valid_png(&bytes));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_end_to_end_default_title_file_name() {
    let dir = scratch_dir("default-title");
    let result = run_tablechart(&[
        "test/pie.csv", "--kind", "pie", "--category", "category", "--value", "value",
        "--output", dir.to_str().unwrap(), "--dpi", "30", "--no-preview",
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(dir.join("value by category.png").exists());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_end_to_end_request_file() {
    let dir = scratch_dir("request");
    let request = dir.join("request.json");
    fs::write(
        &request,
        r#"{"kind": "scatter", "x": "units", "y": "revenue", "title": "Units vs revenue", "render": {"dpi": 30}}"#,
    )
    .unwrap();
    let result = run_tablechart(&[
        "test/sales.csv",
        "--request",
        request.to_str().unwrap(),
        "--output",
        dir.to_str().unwrap(),
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(dir.join("Units vs revenue.png").exists());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_end_to_end_preview_only() {
    let result = run_tablechart(&["test/sales.csv", "--preview-rows", "3"]);
    let stdout = String::from_utf8(result.expect("preview failed")).unwrap();
    assert!(stdout.contains("region"));
    assert!(stdout.contains("numeric"));
    assert!(stdout.contains("[8 rows x 4 columns]"));
    assert!(!stdout.contains("Q2"));
}

#[test]
fn test_end_to_end_columns_listing() {
    let result = run_tablechart(&["test/sales.csv", "--columns"]);
    let stdout = String::from_utf8(result.expect("listing failed")).unwrap();
    assert_eq!(
        stdout,
        "region\ttext\nquarter\ttext\nrevenue\tnumeric\nunits\tnumeric\n"
    );
}

#[test]
fn test_end_to_end_truncated_csv_reports_error() {
    let result = run_tablechart(&["test/truncated.csv", "--kind", "line", "-x", "month", "-y", "sales"]);
    let stderr = result.expect_err("truncated CSV should fail");
    assert!(stderr.contains("Error while processing file"), "{}", stderr);
    assert!(!stderr.contains("panicked"), "{}", stderr);
}

#[test]
fn test_end_to_end_unsupported_extension() {
    let result = run_tablechart(&["test/notes.txt", "--kind", "pie", "--category", "category", "--value", "value"]);
    let stderr = result.expect_err("txt upload should be rejected");
    assert!(stderr.contains("Unsupported file type"), "{}", stderr);
}

#[test]
fn test_end_to_end_text_value_column() {
    let result = run_tablechart(&["test/sales.csv", "--kind", "bar", "-x", "revenue", "-y", "region"]);
    let stderr = result.expect_err("text value column should fail");
    assert!(stderr.contains("not numeric"), "{}", stderr);
}

#[test]
fn test_end_to_end_invalid_expression() {
    let result = run_tablechart(&["test/sales.csv", "--spec", "invalid syntax here"]);
    let stderr = result.expect_err("should have failed with parse error");
    assert!(stderr.contains("Parse error"), "{}", stderr);
}

#[test]
fn test_pie_wedge_proportions() {
    let table = intake::read_table(Path::new("test/pie.csv")).unwrap();
    let prepared = prepare::prepare(&table, &ChartSpec::pie("category", "value")).unwrap();
    let PreparedChart::Pie(series) = prepared else {
        panic!("Expected pie series");
    };
    assert_eq!(series.labels, vec!["A", "B"]);
    assert_eq!(series.percentage_labels(), vec!["33.3%", "66.7%"]);
}

#[test]
fn test_line_sort_direction_reorders_positions() {
    let table = intake::read_table(Path::new("test/truncated.csv"));
    assert!(table.is_err());

    let table = intake::read_table_from_bytes(
        "months.csv",
        b"month,sales\njan,20\nfeb,10\nmar,30\n".to_vec(),
    )
    .unwrap();
    let line = ChartSpec::axes(ChartKind::Line, "month", "sales");

    let order = |direction| match prepare::prepare(&table, &line.clone().with_sort(Some(direction))) {
        Ok(PreparedChart::Axes(series)) => (series.x_axis, series.y),
        other => panic!("Unexpected {:?}", other),
    };

    let (asc_axis, asc_y) = order(SortDirection::Ascending);
    let (desc_axis, desc_y) = order(SortDirection::Descending);
    assert_eq!(asc_axis, XAxis::Categorical(vec!["feb".into(), "jan".into(), "mar".into()]));
    assert_eq!(desc_axis, XAxis::Categorical(vec!["mar".into(), "jan".into(), "feb".into()]));
    assert_eq!(asc_y, vec![10.0, 20.0, 30.0]);
    assert_eq!(desc_y, vec![30.0, 20.0, 10.0]);
}

#[test]
fn test_unsupported_extension_gate() {
    assert!(FileKind::from_path(Path::new("test/notes.txt")).is_err());
    assert_eq!(FileKind::from_path(Path::new("test/sales.xlsx")).unwrap(), FileKind::Spreadsheet);
}

#[test]
fn test_spreadsheet_pie() {
    let table = intake::read_table(Path::new("test/sales.xlsx")).unwrap();
    assert_eq!(table.headers, vec!["region", "sales"]);
    assert_eq!(table.row_count(), 4);

    let spec = ChartSpec::pie("region", "sales").with_sort(Some(SortDirection::Descending));
    let chart = render_chart(&table, &spec, &small()).unwrap();
    assert!(is_valid_png(&chart.png));
    assert_eq!(chart.file_name, "sales by region.png");
}

#[test]
fn test_ragged_csv_is_error() {
    let result = intake::read_table(Path::new("test/ragged.csv"));
    assert!(result.is_err());
}

#[test]
fn test_unicode_columns() {
    let table = intake::read_table(Path::new("test/unicode.csv")).unwrap();
    let spec = ChartSpec::axes(ChartKind::Bar, "ville", "température");
    let chart = render_chart(&table, &spec, &small()).unwrap();
    assert!(is_valid_png(&chart.png));
    assert_eq!(chart.file_name, "température vs ville.png");
}

#[test]
fn test_spreadsheet_dates_become_calendar_labels() {
    let table = intake::read_table(Path::new("test/dates.xlsx")).unwrap();
    assert_eq!(table.headers, vec!["month", "sales"]);
    let months: Vec<String> = table.rows.iter().map(|r| r[0].to_string()).collect();
    assert_eq!(months, vec!["2024-01-01", "2024-02-01", "2024-03-01"]);

    let spec = ChartSpec::axes(ChartKind::Line, "month", "sales");
    let PreparedChart::Axes(series) = prepare::prepare(&table, &spec).unwrap() else {
        panic!("Expected axis series");
    };
    assert_eq!(series.x_name(0.0), "2024-01-01");
    assert!(is_valid_png(&render_chart(&table, &spec, &small()).unwrap().png));
}

#[test]
fn test_end_to_end_infinite_value_fails_fast() {
    let dir = scratch_dir("infinite");
    let csv = dir.join("inf.csv");
    fs::write(&csv, "k,v\na,1\nb,inf\n").unwrap();
    for kind in ["bar", "line", "scatter"] {
        let result = run_tablechart(&[
            csv.to_str().unwrap(), "--kind", kind, "-x", "k", "-y", "v", "--stdout", "--dpi", "30",
        ]);
        let stderr = result.expect_err("infinite value should be rejected");
        assert!(stderr.contains("NaN or Inf"), "{}: {}", kind, stderr);
    }
    let result = run_tablechart(&[
        csv.to_str().unwrap(), "--kind", "pie", "--category", "k", "--value", "v", "--stdout",
    ]);
    assert!(result.is_err());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_end_to_end_dpi_out_of_range() {
    for dpi in ["0", "100000"] {
        let result = run_tablechart(&[
            "test/pie.csv", "--kind", "pie", "--category", "category", "--value", "value",
            "--stdout", "--dpi", dpi,
        ]);
        let stderr = result.expect_err("dpi outside 1-1200 should be rejected");
        assert!(stderr.contains("DPI must be between"), "{}", stderr);
        assert!(!stderr.contains("panicked"), "{}", stderr);
    }
}

#[test]
fn test_end_to_end_font_option() {
    let result = run_tablechart(&[
        "test/unicode.csv", "--kind", "bar", "-x", "ville", "-y", "température",
        "--font", "sans-serif", "--stdout", "--dpi", "30",
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()));
}

#[test]
fn test_end_to_end_bad_title_rejected_before_render() {
    let dir = scratch_dir("bad-title");
    let result = run_tablechart(&[
        "test/pie.csv", "--kind", "pie", "--category", "category", "--value", "value",
        "--title", "Sales 1/2", "--output", dir.to_str().unwrap(), "--dpi", "30", "--no-preview",
    ]);
    let stderr = result.expect_err("title with a path separator should fail");
    assert!(stderr.contains("cannot be used as a file name"), "{}", stderr);
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);

    // the same title is fine when nothing is saved
    let result = run_tablechart(&[
        "test/pie.csv", "--kind", "pie", "--category", "category", "--value", "value",
        "--title", "Sales 1/2", "--stdout", "--dpi", "30",
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_end_to_end_empty_title_uses_default_name() {
    let dir = scratch_dir("empty-title");
    let result = run_tablechart(&[
        "test/pie.csv", "--kind", "pie", "--category", "category", "--value", "value",
        "--title", "", "--output", dir.to_str().unwrap(), "--dpi", "30", "--no-preview",
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(dir.join("value by category.png").exists());
    fs::remove_dir_all(&dir).unwrap();
}
