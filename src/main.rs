use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tablechart::preview::{self, DEFAULT_PREVIEW_ROWS};
use tablechart::spec::{ChartKind, ChartRequest, ChartSpec, SortDirection};
use tablechart::{export, intake, parser, runtime, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "tablechart")]
#[command(about = "Render bar, line, scatter and pie charts from CSV or Excel files", long_about = None)]
struct Args {
    /// Data file (.csv, .xlsx or .xls)
    file: PathBuf,

    /// Chart kind: bar, line, scatter or pie
    #[arg(short, long)]
    kind: Option<ChartKind>,

    /// X axis column (bar, line, scatter)
    #[arg(short = 'x', long)]
    x: Option<String>,

    /// Y axis column, must be numeric (bar, line, scatter)
    #[arg(short = 'y', long)]
    y: Option<String>,

    /// Category column (pie)
    #[arg(long)]
    category: Option<String>,

    /// Value column, must be numeric (pie)
    #[arg(long)]
    value: Option<String>,

    /// Sort by the value column: asc or desc
    #[arg(short, long)]
    sort: Option<SortDirection>,

    /// Chart title, also the output file name
    #[arg(short, long)]
    title: Option<String>,

    /// Chart expression (e.g. 'pie(category: region, value: sales) | sort(desc)')
    #[arg(long, conflicts_with_all = ["kind", "request"])]
    spec: Option<String>,

    /// JSON request file with the chart choices and render options
    #[arg(long, conflicts_with = "kind")]
    request: Option<PathBuf>,

    /// Directory for the PNG file
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Write the PNG to stdout instead of a file
    #[arg(long)]
    stdout: bool,

    /// Number of rows shown in the preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,

    /// Skip the data preview
    #[arg(long)]
    no_preview: bool,

    /// List column names and types, then exit
    #[arg(long)]
    columns: bool,

    /// Output resolution (1-1200)
    #[arg(long)]
    dpi: Option<u32>,

    /// Font family for titles and labels, e.g. a CJK font such as "Noto Sans CJK SC"
    #[arg(long)]
    font: Option<String>,

    /// Debug logging unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error while processing file: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let table = intake::read_table(&args.file)?;

    if args.columns {
        print!("{}", preview::render_columns(&table));
        return Ok(());
    }

    if !args.no_preview {
        let text = preview::render_preview(&table, args.preview_rows);
        // keep stdout clean when it carries the PNG
        if args.stdout {
            eprint!("{}", text);
        } else {
            print!("{}", text);
        }
    }

    let Some((spec, options)) = chart_choice(args)? else {
        eprintln!("Choose a chart with --kind or --spec to render");
        return Ok(());
    };
    debug!(?spec, ?options, "chart choice");

    // fail before rendering when the title cannot name the saved file
    if !args.stdout {
        export::check_file_name(&spec.title())?;
    }

    let chart = runtime::render_chart(&table, &spec, &options)?;

    if args.stdout {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(&chart.png)
            .context("Failed to write PNG to stdout")?;
        handle.flush().context("Failed to flush stdout")?;
    } else {
        let path = export::save(&args.output, &chart.title, &chart.png)?;
        println!("Saved {}", path.display());
    }

    Ok(())
}

/// Collect the chart spec from an expression, a request file, or individual flags
fn chart_choice(args: &Args) -> Result<Option<(ChartSpec, RenderOptions)>> {
    let (spec, mut options) = if let Some(expr) = &args.spec {
        (parser::parse_expression(expr)?, RenderOptions::default())
    } else if let Some(path) = &args.request {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read request '{}'", path.display()))?;
        let request = ChartRequest::from_json(&text)
            .with_context(|| format!("Invalid request '{}'", path.display()))?;
        let options = request.render.clone();
        (request.into_spec()?, options)
    } else if let Some(kind) = args.kind {
        (spec_from_flags(kind, args)?, RenderOptions::default())
    } else {
        return Ok(None);
    };

    let mut spec = spec;
    if let Some(title) = &args.title {
        spec = spec.with_title(title.clone());
    }
    if args.sort.is_some() {
        spec = spec.with_sort(args.sort);
    }
    if let Some(dpi) = args.dpi {
        options = options.with_dpi(dpi);
    }
    if let Some(font) = &args.font {
        options = options.with_font(font.clone());
    }
    Ok(Some((spec, options)))
}

fn spec_from_flags(kind: ChartKind, args: &Args) -> Result<ChartSpec> {
    if kind.uses_axes() {
        match (&args.x, &args.y) {
            (Some(x), Some(y)) => Ok(ChartSpec::axes(kind, x.clone(), y.clone())),
            _ => bail!("{} charts need --x and --y", kind),
        }
    } else {
        match (&args.category, &args.value) {
            (Some(c), Some(v)) => Ok(ChartSpec::pie(c.clone(), v.clone())),
            _ => bail!("pie charts need --category and --value"),
        }
    }
}
