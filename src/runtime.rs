// Runtime: validate, sort, prepare, draw and encode one chart

use crate::data::Table;
use crate::export;
use crate::graph::Canvas;
use crate::prepare::{self, PreparedChart};
use crate::spec::ChartSpec;
use crate::RenderOptions;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// A finished chart ready for download
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub title: String,
    pub file_name: String,
    pub png: Vec<u8>,
}

/// Render a chart specification to PNG bytes
pub fn render_chart(table: &Table, spec: &ChartSpec, options: &RenderOptions) -> Result<RenderedChart> {
    options.validate()?;
    spec.validate(table)?;

    let title = spec.title();
    debug!(kind = %spec.kind, sort = ?spec.sort, %title, "rendering chart");

    let prepared = prepare::prepare(table, spec).context("Failed to prepare chart data")?;

    let mut canvas = Canvas::for_kind(spec.kind, title.clone(), options)?;
    let drawn = match &prepared {
        PreparedChart::Axes(series) => canvas.draw_axes(series),
        PreparedChart::Pie(series) => canvas.draw_pie(series),
    };
    drawn.context("Failed to render plot")?;

    let png = export::encode_png(&canvas.finish(), options)?;
    info!(kind = %spec.kind, bytes = png.len(), "rendered chart");

    Ok(RenderedChart {
        file_name: export::download_name(&title),
        title,
        png,
    })
}
