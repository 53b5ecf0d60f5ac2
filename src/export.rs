// PNG export: tight bounding box, encoding, and download naming

use anyhow::{anyhow, bail, Context, Result};
use image::{imageops, ImageEncoder, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::graph::Figure;
use crate::RenderOptions;

/// File name offered for a chart title
pub fn download_name(title: &str) -> String {
    format!("{}.png", title)
}

/// Crop to the non-white content plus `pad_inches` and encode as PNG
pub fn encode_png(figure: &Figure, options: &RenderOptions) -> Result<Vec<u8>> {
    let image = RgbImage::from_raw(figure.width, figure.height, figure.pixels.clone())
        .ok_or_else(|| anyhow!("Figure buffer does not match {}x{}", figure.width, figure.height))?;

    let pad = (options.pad_inches * options.dpi as f64).round().max(0.0) as u32;
    let image = match content_bounds(&image) {
        Some((x0, y0, x1, y1)) => {
            let left = x0.saturating_sub(pad);
            let top = y0.saturating_sub(pad);
            let right = (x1 + pad).min(image.width() - 1);
            let bottom = (y1 + pad).min(image.height() - 1);
            debug!(left, top, right, bottom, "tight bounding box");
            imageops::crop_imm(&image, left, top, right - left + 1, bottom - top + 1).to_image()
        }
        None => image,
    };

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgb8,
            )
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

/// Inclusive bounds of every pixel that is not pure white
fn content_bounds(image: &RgbImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0 == [255, 255, 255] {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds
}

/// Titles name the saved file, so they may not be empty or contain path separators
pub fn check_file_name(title: &str) -> Result<()> {
    if title.is_empty() || title.contains('/') || title.contains('\\') {
        bail!("Title '{}' cannot be used as a file name", title);
    }
    Ok(())
}

/// Write PNG bytes to `<dir>/<title>.png`
pub fn save(dir: &Path, title: &str, png: &[u8]) -> Result<PathBuf> {
    check_file_name(title)?;
    let path = dir.join(download_name(title));
    fs::write(&path, png).with_context(|| format!("Failed to write '{}'", path.display()))?;
    info!(path = %path.display(), bytes = png.len(), "saved chart");
    Ok(path)
}
