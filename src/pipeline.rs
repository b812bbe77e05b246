// THEORY:
// The `pipeline` module is the top-level API of the engine. It pairs the two
// core components, the `FrameDecomposer` (frame -> ordered rectangle set)
// and the `SurfacePoolReconciler` (rectangle set -> mutated surface pool),
// and owns the state that flows between them: the surface pool itself and
// the factory that backs it.
//
// The pool deliberately lives here, inside a value the caller owns, rather
// than as ambient shared state. Whoever drives the pipeline decides where
// and when reconciliation runs; the pipeline itself never spawns anything.

use std::time::Duration;

use image::DynamicImage;

use crate::core_modules::decomposer::FrameDecomposer;
use crate::core_modules::reconciler::{SurfacePool, SurfacePoolReconciler};
use crate::core_modules::surface::SurfaceFactory;
use crate::error::{PlayerError, SurfaceError};

// Re-export the data structures callers hold when talking to the pipeline.
pub use crate::core_modules::decomposer::{FsImageSource, ImageSource, MIN_VISIBLE_SIZE};
pub use crate::core_modules::rect::{FrameTarget, LogicRect, ScreenRect};
pub use crate::core_modules::surface::InMemorySurfaceFactory;

/// Tunable playback behavior. Owned by the caller and handed in at
/// construction; nothing here changes mid-run.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Target display width in pixels. Sizes the grid and scales
    /// grid rectangles to screen rectangles.
    pub display_width: u32,
    /// Target display height in pixels.
    pub display_height: u32,
    /// Sampling step in pixels per grid cell. Smaller is finer but produces
    /// more surfaces. Recommended range 20-50.
    pub step_size: u32,
    /// Cells with brightness below this count as dark, in [0, 1].
    pub brightness_threshold: f32,
    /// If a frame needs more than `pool * reset_ratio` surfaces, the pool is
    /// rebuilt from scratch instead of updated incrementally. Handles scene
    /// cuts. Must be > 1.0.
    pub reset_ratio: f64,
    /// Time between frames. 40 ms corresponds to 25 fps.
    pub frame_interval: Duration,
    /// Whether playback drivers should wind down as soon as the sequence
    /// ends, or leave the process up for the surrounding system to close.
    pub auto_close_when_finished: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            display_width: 1920,
            display_height: 1080,
            step_size: 25,
            brightness_threshold: 0.4,
            reset_ratio: 1.9,
            frame_interval: Duration::from_millis(200),
            auto_close_when_finished: true,
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), PlayerError> {
        if self.step_size == 0 {
            return Err(PlayerError::Config("step_size must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.brightness_threshold) {
            return Err(PlayerError::Config(
                "brightness_threshold must be within [0.0, 1.0]".into(),
            ));
        }
        if self.reset_ratio <= 1.0 {
            return Err(PlayerError::Config("reset_ratio must be > 1.0".into()));
        }
        Ok(())
    }
}

/// One frame pipeline: decompose a frame, reconcile the pool. Owns the pool
/// and the surface factory for its whole lifetime; surfaces are created and
/// destroyed nowhere else.
pub struct FramePipeline<F: SurfaceFactory> {
    decomposer: FrameDecomposer,
    reconciler: SurfacePoolReconciler,
    pool: SurfacePool<F::Handle>,
    factory: F,
}

impl<F: SurfaceFactory> FramePipeline<F> {
    pub fn new(config: &PlayerConfig, factory: F) -> Self {
        Self {
            decomposer: FrameDecomposer::new(
                config.display_width,
                config.display_height,
                config.step_size,
                config.brightness_threshold,
            ),
            reconciler: SurfacePoolReconciler::new(config.reset_ratio),
            pool: SurfacePool::new(),
            factory,
        }
    }

    /// The decomposer is stateless and cheap to clone; drivers clone it to
    /// run decomposition off-thread while the pipeline stays put.
    pub fn decomposer(&self) -> &FrameDecomposer {
        &self.decomposer
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn surface_count(&self) -> usize {
        self.pool.len()
    }

    /// Decomposes one decoded frame and applies it in a single call.
    pub fn advance(&mut self, image: &DynamicImage) -> Result<usize, SurfaceError> {
        let target = self.decomposer.decompose(image);
        self.apply(&target)
    }

    /// Reconciles the pool against an already-computed frame target.
    /// Returns the number of live surfaces afterward.
    pub fn apply(&mut self, target: &FrameTarget) -> Result<usize, SurfaceError> {
        self.reconciler
            .reconcile(&mut self.pool, target, &mut self.factory)?;
        Ok(self.pool.len())
    }

    /// Destroys every surface and empties the pool. The stop path; also safe
    /// to call on an already-empty pipeline.
    pub fn teardown(&mut self) -> Result<(), SurfaceError> {
        self.reconciler.teardown(&mut self.pool, &mut self.factory)
    }
}
