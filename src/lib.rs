// Library exports for tablechart

pub mod data;
pub mod export;
pub mod graph;
pub mod intake;
pub mod palette;
pub mod parser;
pub mod prepare;
pub mod preview;
pub mod runtime;
pub mod spec;

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::spec::ChartKind;

/// Accepted output resolution range
pub const DPI_RANGE: std::ops::RangeInclusive<u32> = 1..=1200;
/// Largest canvas we are willing to allocate
pub const MAX_PIXELS: u64 = 200_000_000;

/// Figure and export settings
#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Padding kept around the content when cropping to the tight bounding box
    #[serde(default = "default_pad_inches")]
    pub pad_inches: f64,
    /// Figure size in inches; falls back to the per-kind default
    #[serde(default)]
    pub figure_size: Option<(f64, f64)>,
    /// Font family for all text; a system font name such as "SimHei" for CJK labels
    #[serde(default = "default_font")]
    pub font: String,
}

fn default_dpi() -> u32 { 300 }
fn default_pad_inches() -> f64 { 0.1 }
fn default_font() -> String { "sans-serif".to_string() }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: 300,
            pad_inches: 0.1,
            figure_size: None,
            font: default_font(),
        }
    }
}

impl RenderOptions {
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    /// Reject settings that would produce an empty or unallocatable canvas
    pub fn validate(&self) -> Result<()> {
        if !DPI_RANGE.contains(&self.dpi) {
            bail!(
                "DPI must be between {} and {}, got {}",
                DPI_RANGE.start(),
                DPI_RANGE.end(),
                self.dpi
            );
        }
        if !self.pad_inches.is_finite() || self.pad_inches < 0.0 {
            bail!("pad_inches must be a non-negative number, got {}", self.pad_inches);
        }
        if let Some((w, h)) = self.figure_size {
            if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
                bail!("Figure size must be positive, got {}x{} inches", w, h);
            }
        }
        if self.font.trim().is_empty() {
            bail!("Font family cannot be empty");
        }
        Ok(())
    }

    /// Figure size in inches for a chart kind
    pub fn figure_inches(&self, kind: ChartKind) -> (f64, f64) {
        self.figure_size.unwrap_or(match kind {
            ChartKind::Pie => (10.0, 8.0),
            _ => (10.0, 6.0),
        })
    }

    /// Pixel dimensions of the canvas for a chart kind
    pub fn pixel_size(&self, kind: ChartKind) -> Result<(u32, u32)> {
        self.validate()?;
        let (w, h) = self.figure_inches(kind);
        let dpi = self.dpi as f64;
        let (width, height) = ((w * dpi).round(), (h * dpi).round());
        if width < 1.0 || height < 1.0 || width * height > MAX_PIXELS as f64 {
            bail!(
                "Figure of {}x{} inches at {} dpi gives an unusable {}x{} pixel canvas",
                w, h, self.dpi, width, height
            );
        }
        Ok((width as u32, height as u32))
    }

    /// Convert a size in points to pixels at the configured DPI
    pub fn points(&self, pt: f64) -> f64 {
        pt * self.dpi as f64 / 72.0
    }
}
