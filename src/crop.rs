//! Trimming of transparent padding around sprite content.

use image::{imageops, RgbaImage};

/// Pixels with alpha above this count as content.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 10;
/// Padding kept around the content box, in pixels.
pub const CROP_MARGIN: u32 = 2;

/// Inclusive pixel bounds of the visible content of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ContentBounds {
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    /// Grows the box by `margin` on every side without leaving a `width`x`height` raster.
    pub fn expand(self, margin: u32, width: u32, height: u32) -> Self {
        Self {
            left: self.left.saturating_sub(margin),
            top: self.top.saturating_sub(margin),
            right: self.right.saturating_add(margin).min(width.saturating_sub(1)),
            bottom: self.bottom.saturating_add(margin).min(height.saturating_sub(1)),
        }
    }
}

/// Smallest box holding every pixel whose alpha exceeds `threshold`, or
/// `None` when there is no such pixel.
pub fn content_bounds(raster: &RgbaImage, threshold: u8) -> Option<ContentBounds> {
    raster
        .enumerate_pixels()
        .filter(|(_, _, p)| p[3] > threshold)
        .fold(None, |acc, (x, y, _)| {
            Some(match acc {
                None => ContentBounds { left: x, top: y, right: x, bottom: y },
                Some(b) => ContentBounds {
                    left: b.left.min(x),
                    top: b.top.min(y),
                    right: b.right.max(x),
                    bottom: b.bottom.max(y),
                },
            })
        })
}

/// Cuts `raster` down to its content plus [`CROP_MARGIN`]. A raster with no
/// visible pixel comes back unchanged.
pub fn crop_to_content(raster: &RgbaImage, threshold: u8) -> RgbaImage {
    let Some(bounds) = content_bounds(raster, threshold) else {
        return raster.clone();
    };
    let b = bounds.expand(CROP_MARGIN, raster.width(), raster.height());
    imageops::crop_imm(raster, b.left, b.top, b.width(), b.height()).to_image()
}
