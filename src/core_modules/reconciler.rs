// THEORY:
// The `SurfacePoolReconciler` is the other half of the engine: it takes the
// rectangle set the decomposer produced and mutates the on-screen surface
// pool until the visible surfaces match it, with as few create, destroy and
// move operations as it can get away with.
//
// Key architectural principles:
// 1.  **Positional identity**: surface i is matched to target rectangle i.
//     No content tracking, no assignment problem. Consecutive frames of a
//     continuous animation produce similar counts in a similar order (both
//     sides are sorted by (y, x)), so index alignment is usually right.
// 2.  **Bounded damage**: when the assumption breaks (a scene cut, a large
//     content change), incremental updating would move every surface a long
//     way for no benefit. The reset ratio caps that: if the target count
//     outgrows the pool by more than the ratio, the pool is torn down and
//     rebuilt in one pass.
// 3.  **Exclusive ownership**: the pool is owned by the driver and handed
//     in by mutable reference. Nothing else creates or destroys surfaces.

use log::debug;

use crate::core_modules::rect::ScreenRect;
use crate::core_modules::surface::SurfaceFactory;
use crate::error::SurfaceError;

/// The ordered set of live surfaces, index-parallel to the most recently
/// applied frame target.
pub struct SurfacePool<H> {
    surfaces: Vec<H>,
}

impl<H> SurfacePool<H> {
    pub fn new() -> Self {
        Self {
            surfaces: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl<H> Default for SurfacePool<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies one frame's rectangle set to a surface pool.
#[derive(Debug, Clone)]
pub struct SurfacePoolReconciler {
    /// Multiplier on the current pool size beyond which incremental
    /// reconciliation is abandoned for a full rebuild. Must be > 1.0.
    reset_ratio: f64,
}

impl SurfacePoolReconciler {
    pub fn new(reset_ratio: f64) -> Self {
        Self { reset_ratio }
    }

    /// Mutates `pool` so that its surfaces' bounds equal `target`, index for
    /// index. Factory failures propagate; a partial pool state is the
    /// caller's signal that the environment is giving out.
    pub fn reconcile<F: SurfaceFactory>(
        &self,
        pool: &mut SurfacePool<F::Handle>,
        target: &[ScreenRect],
        factory: &mut F,
    ) -> Result<(), SurfaceError> {
        if pool.is_empty() || target.len() as f64 > pool.len() as f64 * self.reset_ratio {
            self.rebuild(pool, target, factory)
        } else {
            self.update(pool, target, factory)
        }
    }

    /// Tears the whole pool down. Used on stop and as the first half of a
    /// full reset.
    pub fn teardown<F: SurfaceFactory>(
        &self,
        pool: &mut SurfacePool<F::Handle>,
        factory: &mut F,
    ) -> Result<(), SurfaceError> {
        // Destruction is unconditional: surfaces already gone at the
        // backend still get their destroy call, which must be a no-op.
        for handle in &mut pool.surfaces {
            factory.destroy(handle)?;
        }
        pool.surfaces.clear();
        Ok(())
    }

    fn rebuild<F: SurfaceFactory>(
        &self,
        pool: &mut SurfacePool<F::Handle>,
        target: &[ScreenRect],
        factory: &mut F,
    ) -> Result<(), SurfaceError> {
        debug!(
            "full pool reset: {} surfaces -> {} targets",
            pool.len(),
            target.len()
        );
        self.teardown(pool, factory)?;
        for &rect in target {
            let handle = factory.create(rect)?;
            pool.surfaces.push(handle);
        }
        Ok(())
    }

    fn update<F: SurfaceFactory>(
        &self,
        pool: &mut SurfacePool<F::Handle>,
        target: &[ScreenRect],
        factory: &mut F,
    ) -> Result<(), SurfaceError> {
        // Shrink from the tail, index-descending, so surviving indices stay
        // aligned with the target.
        while pool.len() > target.len() {
            if let Some(mut handle) = pool.surfaces.pop() {
                factory.destroy(&mut handle)?;
            }
        }

        // Grow with placeholder bounds; the positioning pass below moves the
        // new surfaces into place.
        while pool.len() < target.len() {
            let handle = factory.create(ScreenRect::EMPTY)?;
            pool.surfaces.push(handle);
        }

        // Positional diff: only touch surfaces whose bounds actually differ.
        for (handle, &rect) in pool.surfaces.iter_mut().zip(target) {
            if factory.get_bounds(handle) != rect {
                factory.set_bounds(handle, rect)?;
            }
        }
        Ok(())
    }
}
