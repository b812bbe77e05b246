// THEORY:
// The `grid` module is the bridge between a decoded raster frame and the
// cell-based world the decomposer works in. A full-resolution frame is far
// too fine-grained to drive on-screen surfaces one region per pixel, so the
// frame is pooled down to a coarse `BrightnessGrid` where each cell stands
// for a `step_size`-sized block of display pixels.
//
// Key architectural principles:
// 1.  **Speed over fidelity**: the downsample uses nearest-neighbor
//     resampling. Each cell drives a whole on-screen rectangle, so sub-cell
//     accuracy buys nothing and the cheap filter keeps per-frame cost low.
// 2.  **Immutability per frame**: a `BrightnessGrid` is computed once per
//     frame and never mutated. All per-decomposition bookkeeping lives in
//     the separate `VisitedMask`.
// 3.  **Row-major layout**: cells are stored flat, row-major, which matches
//     the decomposer's scan order exactly.

use image::DynamicImage;
use image::imageops::FilterType;

/// A downsampled brightness map of one frame. Each cell holds a brightness
/// value in [0, 1]; cells below the configured threshold are "dark" and
/// eligible for rectangle coverage.
pub struct BrightnessGrid {
    cols: usize,
    rows: usize,
    /// Flattened row-major cell values, `rows * cols` long.
    cells: Vec<f32>,
}

impl BrightnessGrid {
    /// Resamples `image` down to `cols x rows` and records per-cell
    /// brightness.
    pub fn from_image(image: &DynamicImage, cols: u32, rows: u32) -> Self {
        let low_res = image.resize_exact(cols, rows, FilterType::Nearest).to_rgb8();
        let cells = low_res
            .pixels()
            .map(|p| lightness(p.0[0], p.0[1], p.0[2]))
            .collect();
        Self {
            cols: cols as usize,
            rows: rows as usize,
            cells,
        }
    }

    /// Builds a grid directly from cell values (row-major). The main entry
    /// point for algorithm tests, which want exact brightness patterns
    /// without going through an image decode.
    pub fn from_cells(cols: usize, rows: usize, cells: Vec<f32>) -> Self {
        debug_assert_eq!(cells.len(), cols * rows);
        Self { cols, rows, cells }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn brightness(&self, x: usize, y: usize) -> f32 {
        self.cells[y * self.cols + x]
    }
}

/// Brightness of one RGB sample as HSL lightness: `(max + min) / 2`,
/// normalized to [0, 1]. This is the same measure the frame content was
/// authored against, so the threshold keeps its meaning.
fn lightness(r: u8, g: u8, b: u8) -> f32 {
    let max = r.max(g).max(b) as f32;
    let min = r.min(g).min(b) as f32;
    (max + min) / 2.0 / 255.0
}

/// Per-decomposition bookkeeping: which grid cells have already been claimed
/// by a rectangle. Once a cell is marked it is never revisited within the
/// same frame.
pub struct VisitedMask {
    cols: usize,
    cells: Vec<bool>,
}

impl VisitedMask {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            cells: vec![false; cols * rows],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.cols + x]
    }

    pub fn mark(&mut self, x: usize, y: usize) {
        self.cells[y * self.cols + x] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn lightness_is_hsl_midpoint() {
        assert_eq!(lightness(0, 0, 0), 0.0);
        assert_eq!(lightness(255, 255, 255), 1.0);
        // Pure red: (255 + 0) / 2 / 255 = 0.5.
        assert_eq!(lightness(255, 0, 0), 0.5);
    }

    #[test]
    fn grid_from_uniform_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 80, Rgb([0, 0, 0])));
        let grid = BrightnessGrid::from_image(&image, 4, 3);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.rows(), 3);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(grid.brightness(x, y), 0.0);
            }
        }
    }

    #[test]
    fn grid_preserves_row_major_layout() {
        let grid = BrightnessGrid::from_cells(2, 2, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(grid.brightness(0, 0), 0.1);
        assert_eq!(grid.brightness(1, 0), 0.2);
        assert_eq!(grid.brightness(0, 1), 0.3);
        assert_eq!(grid.brightness(1, 1), 0.4);
    }

    #[test]
    fn visited_mask_starts_clear_and_sticks() {
        let mut mask = VisitedMask::new(3, 2);
        assert!(!mask.get(2, 1));
        mask.mark(2, 1);
        assert!(mask.get(2, 1));
        assert!(!mask.get(1, 1));
    }
}
