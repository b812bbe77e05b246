// THEORY:
// This file is the main entry point for the `window_mosaic` library crate.
// The engine plays a raster image sequence as a pool of on-screen surfaces:
// each frame is downsampled onto a coarse brightness grid, its dark cells
// are greedily partitioned into maximal rectangles, and a pool of surfaces
// is reconciled so the visible bounds match that frame's rectangles with
// minimal create/destroy churn.
//
// The public surface is deliberately small: `pipeline` exposes the
// per-frame engine (`FramePipeline` plus its config), `player` adds the
// timer-driven driver over an image folder, and `error` carries the failure
// taxonomy. The algorithmic internals live in `core_modules` and are
// reachable for callers that want to drive decomposition or reconciliation
// separately.

pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod player;

pub use error::{PlayerError, SurfaceError};
pub use pipeline::{FramePipeline, PlayerConfig};
pub use player::{Player, TickOutcome};
