use anyhow::{Context, Result};
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::ops::Range;

use crate::palette;
use crate::prepare::{AxisSeries, PieSeries, XAxis};
use crate::spec::ChartKind;
use crate::{RenderOptions, MAX_PIXELS};

/// Bar width in category units
const BAR_WIDTH: f64 = 0.8;

/// Rendered RGB pixels
#[derive(Debug, Clone)]
pub struct Figure {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Font and stroke sizes in pixels, derived from point sizes at the target DPI
#[derive(Debug, Clone, Copy)]
struct Sizes {
    title: f64,
    axis_label: f64,
    tick: f64,
    line_width: u32,
    marker: i32,
    margin: u32,
}

impl Sizes {
    fn new(options: &RenderOptions) -> Self {
        Self {
            title: options.points(12.0),
            axis_label: options.points(10.0),
            tick: options.points(10.0),
            line_width: options.points(1.5).round().max(1.0) as u32,
            marker: options.points(3.0).round().max(1.0) as i32,
            margin: options.points(8.0).round() as u32,
        }
    }
}

/// Single-chart canvas backed by an RGB buffer
pub struct Canvas {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
    title: String,
    font: String,
    sizes: Sizes,
}

impl Canvas {
    pub fn new(width: u32, height: u32, title: impl Into<String>, options: &RenderOptions) -> Result<Self> {
        if width == 0 || height == 0 {
            anyhow::bail!("Cannot create canvas of size {}x{}", width, height);
        }
        if width as u64 * height as u64 > MAX_PIXELS {
            anyhow::bail!("Canvas of size {}x{} is too large", width, height);
        }
        options.validate()?;

        Ok(Canvas {
            buffer: vec![0u8; (width as usize) * (height as usize) * 3],
            width,
            height,
            title: title.into(),
            font: options.font.clone(),
            sizes: Sizes::new(options),
        })
    }

    /// Canvas sized for a chart kind at the configured DPI
    pub fn for_kind(kind: ChartKind, title: impl Into<String>, options: &RenderOptions) -> Result<Self> {
        let (width, height) = options.pixel_size(kind)?;
        Self::new(width, height, title, options)
    }

    /// Draw a bar, line or scatter chart
    pub fn draw_axes(&mut self, series: &AxisSeries) -> Result<()> {
        if series.x.len() != series.y.len() {
            anyhow::bail!(
                "X and Y data must have the same length (x: {}, y: {})",
                series.x.len(),
                series.y.len()
            );
        }
        if series.x.is_empty() {
            anyhow::bail!("Cannot draw a chart with no data points");
        }

        let sizes = self.sizes;
        let font = FontFamily::from(self.font.as_str());
        let (x_range, y_range) = axis_ranges(series)?;
        let categories = match &series.x_axis {
            XAxis::Categorical(labels) => Some(labels.clone()),
            XAxis::Continuous => None,
        };

        // Rotated category labels need room below the axis
        let x_area = match &categories {
            Some(labels) => {
                let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(1);
                (longest as f64 * sizes.tick * 0.6 + sizes.tick * 2.5 + sizes.axis_label) as u32
            }
            None => (sizes.tick * 2.5 + sizes.axis_label) as u32,
        };
        let y_area = (sizes.tick * 5.0 + sizes.axis_label) as u32;

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let mut chart = ChartBuilder::on(&root)
            .margin(sizes.margin)
            .caption(&self.title, (font, sizes.title))
            .x_label_area_size(x_area)
            .y_label_area_size(y_area)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        let category_formatter = |x: &f64| -> String {
            match &categories {
                Some(labels) if (x - x.round()).abs() < 1e-6 && x.round() >= 0.0 => {
                    labels.get(x.round() as usize).cloned().unwrap_or_default()
                }
                _ => String::new(),
            }
        };
        let rotated = TextStyle::from((font, sizes.tick).into_font())
            .transform(FontTransform::Rotate90);

        let mut mesh = chart.configure_mesh();
        mesh.x_desc(series.x_label.as_str())
            .y_desc(series.y_label.as_str())
            .label_style((font, sizes.tick))
            .axis_desc_style((font, sizes.axis_label))
            .disable_x_mesh();
        if let Some(labels) = &categories {
            mesh.x_labels(labels.len())
                .x_label_formatter(&category_formatter)
                .x_label_style(rotated);
        }
        mesh.draw().context("Failed to draw mesh")?;

        let color = palette::color(0);
        match series.kind {
            ChartKind::Bar => {
                chart
                    .draw_series(series.points().into_iter().map(|(x, y)| {
                        Rectangle::new(
                            [(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, y)],
                            color.filled(),
                        )
                    }))
                    .context("Failed to draw bars")?;
            }
            ChartKind::Line => {
                chart
                    .draw_series(LineSeries::new(
                        series.points(),
                        color.stroke_width(sizes.line_width),
                    ))
                    .context("Failed to draw line series")?;
            }
            ChartKind::Scatter => {
                chart
                    .draw_series(
                        series
                            .points()
                            .into_iter()
                            .map(|(x, y)| Circle::new((x, y), sizes.marker, color.filled())),
                    )
                    .context("Failed to draw point series")?;
            }
            ChartKind::Pie => anyhow::bail!("Pie charts are drawn with draw_pie"),
        }

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Draw proportional wedges with category and percentage labels
    pub fn draw_pie(&mut self, series: &PieSeries) -> Result<()> {
        if series.values.is_empty() {
            anyhow::bail!("Cannot draw a pie chart with no wedges");
        }

        let sizes = self.sizes;
        let font = FontFamily::from(self.font.as_str());
        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let area = root
            .titled(&self.title, (font, sizes.title))
            .context("Failed to draw title")?;

        let (w, h) = area.dim_in_pixel();
        let center = ((w / 2) as i32, (h / 2) as i32);
        let radius = w.min(h) as f64 * 0.38;
        let colors = palette::colors(series.values.len());

        let mut pie = Pie::new(&center, &radius, &series.values, &colors, &series.labels);
        pie.label_style((font, sizes.tick));
        pie.percentages((font, sizes.tick).into_font().color(&BLACK));
        area.draw(&pie).context("Failed to draw pie")?;

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    pub fn finish(self) -> Figure {
        Figure {
            pixels: self.buffer,
            width: self.width,
            height: self.height,
        }
    }
}

/// Axis ranges with 5% padding; bar charts always include the zero baseline
fn axis_ranges(series: &AxisSeries) -> Result<(Range<f64>, Range<f64>)> {
    let x_range = match &series.x_axis {
        XAxis::Categorical(labels) => -0.5..(labels.len().max(1) as f64 - 0.5),
        XAxis::Continuous => padded(min_of(&series.x), max_of(&series.x)),
    };

    let (mut y_min, mut y_max) = (min_of(&series.y), max_of(&series.y));
    if series.kind == ChartKind::Bar {
        y_min = y_min.min(0.0);
        y_max = y_max.max(0.0);
    }
    let y_range = padded(y_min, y_max);

    for (axis, range) in [("x", &x_range), ("y", &y_range)] {
        if !(range.start.is_finite() && range.end.is_finite() && range.start < range.end) {
            anyhow::bail!(
                "Axis limits cannot be NaN or Inf: {} range is {}..{}",
                axis,
                range.start,
                range.end
            );
        }
    }
    Ok((x_range, y_range))
}

fn padded(min: f64, max: f64) -> Range<f64> {
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().cloned().fold(f64::INFINITY, f64::min)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
}
