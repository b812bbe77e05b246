// THEORY:
// The `FrameDecomposer` turns one decoded frame into the ordered rectangle
// set that drives the surface pool. It is the algorithmic core of the whole
// engine; everything around it is scheduling and bookkeeping.
//
// Key architectural principles:
// 1.  **Greedy, not optimal**: rectangles are claimed by a single-pass
//     right-then-down growth from the first unvisited dark cell in scan
//     order. A differently shaped dark region can be cut into more
//     rectangles than a global partition would need. That bias is part of
//     the observable contract: the scan order and anchoring determine the
//     exact rectangle shapes frame after frame, and the positional diffing
//     downstream depends on that determinism.
// 2.  **Display-driven grid**: grid dimensions come from the display
//     resolution, not the source image. Every frame of a sequence maps onto
//     the same grid regardless of its native size.
// 3.  **Failure is an empty frame**: a frame that cannot be decoded produces
//     an empty target rather than an error. Playback never stops for one
//     corrupt frame; the next tick brings a fresh one.

use std::path::Path;

use image::DynamicImage;
use log::warn;

use crate::core_modules::grid::{BrightnessGrid, VisitedMask};
use crate::core_modules::rect::{FrameTarget, LogicRect, sort_frame_target};

/// Minimum on-screen dimension for a rectangle to survive the decomposition,
/// in pixels. Anything thinner is noise at surface scale.
pub const MIN_VISIBLE_SIZE: i32 = 10;

/// Loads decoded frames for the decomposer. The engine owns no image format
/// knowledge; this seam is where decoding lives, and it is also what lets
/// tests feed synthetic frames without touching the filesystem.
pub trait ImageSource: Send + Sync {
    fn load(&self, path: &Path) -> image::ImageResult<DynamicImage>;
}

/// The shipping source: decodes straight from disk.
pub struct FsImageSource;

impl ImageSource for FsImageSource {
    fn load(&self, path: &Path) -> image::ImageResult<DynamicImage> {
        image::open(path)
    }
}

/// Decomposes frames into dark-region rectangles for a fixed display
/// geometry and tuning. Cheap to clone; per-frame state lives on the stack
/// of each `decompose` call.
#[derive(Debug, Clone)]
pub struct FrameDecomposer {
    display_width: u32,
    display_height: u32,
    /// Pixels per grid cell. Larger is coarser and faster.
    step_size: u32,
    /// Cells with brightness below this are dark, in [0, 1].
    brightness_threshold: f32,
}

impl FrameDecomposer {
    pub fn new(
        display_width: u32,
        display_height: u32,
        step_size: u32,
        brightness_threshold: f32,
    ) -> Self {
        Self {
            display_width,
            display_height,
            step_size,
            brightness_threshold,
        }
    }

    /// Loads a frame through `source` and decomposes it. Decode failure is
    /// absorbed here: the frame renders as empty and playback carries on.
    pub fn decompose_source(&self, source: &dyn ImageSource, path: &Path) -> FrameTarget {
        match source.load(path) {
            Ok(image) => self.decompose(&image),
            Err(err) => {
                warn!("skipping undecodable frame {}: {err}", path.display());
                Vec::new()
            }
        }
    }

    /// Decomposes one decoded frame into its ordered rectangle set.
    pub fn decompose(&self, image: &DynamicImage) -> FrameTarget {
        if self.display_width == 0 || self.display_height == 0 || self.step_size == 0 {
            return Vec::new();
        }
        let cols = (self.display_width / self.step_size).max(1);
        let rows = (self.display_height / self.step_size).max(1);
        let grid = BrightnessGrid::from_image(image, cols, rows);

        let cell_width = self.display_width as f32 / cols as f32;
        let cell_height = self.display_height as f32 / rows as f32;

        let mut target: FrameTarget = self
            .decompose_grid(&grid)
            .into_iter()
            .map(|logic| logic.to_screen(cell_width, cell_height))
            .filter(|screen| screen.width >= MIN_VISIBLE_SIZE && screen.height >= MIN_VISIBLE_SIZE)
            .collect();
        sort_frame_target(&mut target);
        target
    }

    /// Claims rectangles over every dark cell of `grid`, in scan order,
    /// before scaling or minimum-size filtering. Together the returned
    /// rectangles cover each dark cell exactly once.
    pub fn decompose_grid(&self, grid: &BrightnessGrid) -> Vec<LogicRect> {
        let mut visited = VisitedMask::new(grid.cols(), grid.rows());
        let mut rects = Vec::new();
        for y in 0..grid.rows() {
            for x in 0..grid.cols() {
                if !visited.get(x, y) && self.is_dark(grid, x, y) {
                    rects.push(self.claim_rect(grid, &mut visited, x, y));
                }
            }
        }
        rects
    }

    fn is_dark(&self, grid: &BrightnessGrid, x: usize, y: usize) -> bool {
        grid.brightness(x, y) < self.brightness_threshold
    }

    /// The greedy maximal-rectangle claim. Grows right along the anchor row
    /// while cells are unvisited and dark, then grows down row by row,
    /// accepting a row only if the full claimed width is unvisited and dark
    /// across it. Marks the whole block visited before returning.
    fn claim_rect(
        &self,
        grid: &BrightnessGrid,
        visited: &mut VisitedMask,
        start_x: usize,
        start_y: usize,
    ) -> LogicRect {
        let mut width = 0;
        for x in start_x..grid.cols() {
            if !visited.get(x, start_y) && self.is_dark(grid, x, start_y) {
                width += 1;
            } else {
                break;
            }
        }

        let mut height = 0;
        'rows: for y in start_y..grid.rows() {
            for x in start_x..start_x + width {
                if visited.get(x, y) || !self.is_dark(grid, x, y) {
                    break 'rows;
                }
            }
            height += 1;
        }

        for y in start_y..start_y + height {
            for x in start_x..start_x + width {
                visited.mark(x, y);
            }
        }

        LogicRect {
            x: start_x as u32,
            y: start_y as u32,
            width: width as u32,
            height: height as u32,
        }
    }
}
