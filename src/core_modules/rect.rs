// THEORY:
// The `rect` module defines the two coordinate spaces the engine moves
// between. A `LogicRect` lives on the coarse brightness grid, where one cell
// stands for a whole block of screen pixels. A `ScreenRect` lives in display
// pixels and is what a surface is ultimately positioned to.
//
// The split matters because the decomposition algorithm reasons purely in
// grid cells (cheap, small, bounds-checked), while everything downstream of
// it (filtering, ordering, reconciliation) only ever sees screen pixels. The
// conversion happens exactly once per claimed rectangle, through
// `LogicRect::to_screen`.

/// A rectangle in grid-cell coordinates. Width and height are always >= 1
/// for rectangles produced by the decomposer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl LogicRect {
    /// Scales this grid rectangle into display pixels. Cell dimensions are
    /// fractional (display size rarely divides evenly by the grid), and the
    /// result truncates toward zero, matching integer pixel placement.
    pub fn to_screen(&self, cell_width: f32, cell_height: f32) -> ScreenRect {
        ScreenRect {
            x: (self.x as f32 * cell_width) as i32,
            y: (self.y as f32 * cell_height) as i32,
            width: (self.width as f32 * cell_width) as i32,
            height: (self.height as f32 * cell_height) as i32,
        }
    }

    /// Iterates every grid cell covered by this rectangle, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let (x0, y0, w, h) = (self.x, self.y, self.width, self.height);
        (y0..y0 + h).flat_map(move |y| (x0..x0 + w).map(move |x| (x, y)))
    }
}

/// A rectangle in display-pixel coordinates. This is the unit the surface
/// pool deals in: surface bounds are compared and assigned as `ScreenRect`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    /// The zero rectangle, used as the placeholder bounds for surfaces
    /// created during an incremental grow (the factory makes them visible;
    /// the reconciler positions them in the same pass).
    pub const EMPTY: ScreenRect = ScreenRect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// The ordered rectangle set for one frame: sorted by (y, then x) ascending.
/// The ordering is load-bearing. Reconciliation diffs positionally against
/// the previous frame's pool, so two similar frames must enumerate their
/// rectangles in the same order.
pub type FrameTarget = Vec<ScreenRect>;

/// Sorts a rectangle list into canonical frame-target order.
pub fn sort_frame_target(target: &mut FrameTarget) {
    target.sort_by_key(|r| (r.y, r.x));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_screen_scales_by_cell_size() {
        let logic = LogicRect {
            x: 0,
            y: 0,
            width: 2,
            height: 1,
        };
        let screen = logic.to_screen(20.0, 20.0);
        assert_eq!(screen, ScreenRect::new(0, 0, 40, 20));
    }

    #[test]
    fn to_screen_truncates_fractional_cells() {
        let logic = LogicRect {
            x: 1,
            y: 1,
            width: 3,
            height: 2,
        };
        // 1920 px / 77 cols and 1080 px / 43 rows style fractional cells.
        let screen = logic.to_screen(24.9, 25.1);
        assert_eq!(screen, ScreenRect::new(24, 25, 74, 50));
    }

    #[test]
    fn cells_enumerates_row_major() {
        let logic = LogicRect {
            x: 1,
            y: 2,
            width: 2,
            height: 2,
        };
        let cells: Vec<_> = logic.cells().collect();
        assert_eq!(cells, vec![(1, 2), (2, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn frame_target_sorts_by_y_then_x() {
        let mut target = vec![
            ScreenRect::new(40, 20, 10, 10),
            ScreenRect::new(0, 40, 10, 10),
            ScreenRect::new(0, 20, 10, 10),
        ];
        sort_frame_target(&mut target);
        assert_eq!(
            target,
            vec![
                ScreenRect::new(0, 20, 10, 10),
                ScreenRect::new(40, 20, 10, 10),
                ScreenRect::new(0, 40, 10, 10),
            ]
        );
    }
}
