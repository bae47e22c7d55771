//! Conversion of a raster into lines of true-color block characters.

use std::str::FromStr;

use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::Command;
use image::{imageops, RgbaImage};

use crate::error::{Error, Result};

pub const BLOCK: char = '█';
/// Output columns when the caller does not pick a width.
pub const DEFAULT_WIDTH: u32 = 48;
/// Pixels with alpha below this are drawn as blank space.
pub const OPAQUE_CUTOFF: u8 = 128;
/// Terminal cells are about twice as tall as they are wide.
const CELL_ASPECT: f64 = 0.5;

/// Resampling filter used to bring a raster to the output grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterType(pub imageops::FilterType);

impl Default for FilterType {
    fn default() -> Self {
        Self(imageops::FilterType::Nearest)
    }
}

impl FromStr for FilterType {
    type Err = &'static str;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(match s {
            "nearest" => imageops::FilterType::Nearest,
            "triangle" => imageops::FilterType::Triangle,
            "catmullrom" => imageops::FilterType::CatmullRom,
            "gaussian" => imageops::FilterType::Gaussian,
            "lanczos3" => imageops::FilterType::Lanczos3,
            _ => return Err("Invalid filter type"),
        }))
    }
}

/// Renders rasters at a fixed column width.
#[derive(Debug, Clone)]
pub struct BlockRenderer {
    width: u32,
    filter: FilterType,
}

impl Default for BlockRenderer {
    fn default() -> Self {
        Self { width: DEFAULT_WIDTH, filter: FilterType::default() }
    }
}

impl BlockRenderer {
    pub fn new(width: u32) -> Self {
        Self { width, ..Self::default() }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of text rows a `src_w`x`src_h` raster occupies at this width.
    pub fn target_height(&self, src_w: u32, src_h: u32) -> u32 {
        let h = (src_h as f64 / src_w as f64) * self.width as f64 * CELL_ASPECT;
        (h.round() as u32).max(1)
    }

    /// Produces one line per output row. Opaque pixels become a colored
    /// [`BLOCK`], the rest a space; every line ends with a color reset.
    pub fn render(&self, raster: &RgbaImage) -> Result<String> {
        let (src_w, src_h) = raster.dimensions();
        if self.width == 0 || src_w == 0 || src_h == 0 {
            return Err(Error::InvalidDimension { width: src_w, height: src_h, target: self.width });
        }

        let (w, h) = (self.width, self.target_height(src_w, src_h));
        let scaled;
        let grid = if (src_w, src_h) == (w, h) {
            raster
        } else {
            scaled = imageops::resize(raster, w, h, self.filter.0);
            &scaled
        };

        let mut out = String::new();
        for y in 0..h {
            if y > 0 {
                out.push('\n');
            }
            for x in 0..w {
                let [r, g, b, a] = grid.get_pixel(x, y).0;
                if a < OPAQUE_CUTOFF {
                    out.push(' ');
                    continue;
                }
                SetForegroundColor(Color::Rgb { r, g, b }).write_ansi(&mut out)?;
                out.push(BLOCK);
            }
            ResetColor.write_ansi(&mut out)?;
        }
        Ok(out)
    }
}

/// Renders `raster` at `width` columns with nearest-neighbor sampling.
pub fn render_blocks(raster: &RgbaImage, width: u32) -> Result<String> {
    BlockRenderer::new(width).render(raster)
}
