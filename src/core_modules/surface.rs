// THEORY:
// A "surface" is an on-screen rectangular object with repositionable bounds.
// In a full deployment it is an OS-level window; in tests and headless runs
// it is an in-memory record. The engine never draws into a surface. A
// surface's visual identity (fill color, title) is set once at creation by
// the surrounding system, so the only capabilities the engine needs are
// create, destroy, move, and read-back.
//
// Factoring those four capabilities into the `SurfaceFactory` trait is what
// keeps the reconciler testable: the whole surface pool lifecycle can run
// against `InMemorySurfaceFactory` without a display anywhere in sight.

use crate::core_modules::rect::ScreenRect;
use crate::error::SurfaceError;

/// The window-system seam. Creation, destruction and repositioning may all
/// fail at the environment level (resource exhaustion); such failures
/// propagate to the caller untouched.
///
/// `destroy` must be idempotent: destroying an already-destroyed handle is a
/// no-op, never an error. Teardown paths release unconditionally.
pub trait SurfaceFactory {
    type Handle;

    /// Creates a new visible surface at `bounds`. `ScreenRect::EMPTY` is a
    /// valid initial value for surfaces that will be positioned immediately
    /// after creation.
    fn create(&mut self, bounds: ScreenRect) -> Result<Self::Handle, SurfaceError>;

    /// Destroys the surface. Safe to call on a handle in any state.
    fn destroy(&mut self, handle: &mut Self::Handle) -> Result<(), SurfaceError>;

    fn set_bounds(
        &mut self,
        handle: &mut Self::Handle,
        bounds: ScreenRect,
    ) -> Result<(), SurfaceError>;

    fn get_bounds(&self, handle: &Self::Handle) -> ScreenRect;
}

#[derive(Debug)]
struct SurfaceRecord {
    bounds: ScreenRect,
    alive: bool,
}

/// A display-free `SurfaceFactory`: every surface is a record in a slab.
/// Serves both as the headless playback backend and as the observable mock
/// in reconciler tests, via its operation counters.
#[derive(Debug, Default)]
pub struct InMemorySurfaceFactory {
    records: Vec<SurfaceRecord>,
    /// Live-surface cap; `None` is unlimited. Lets tests exercise the
    /// resource-exhaustion path deterministically.
    capacity: Option<usize>,
    pub created: usize,
    pub destroyed: usize,
    pub repositioned: usize,
}

impl InMemorySurfaceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn live_count(&self) -> usize {
        self.records.iter().filter(|r| r.alive).count()
    }

    pub fn reset_counters(&mut self) {
        self.created = 0;
        self.destroyed = 0;
        self.repositioned = 0;
    }
}

impl SurfaceFactory for InMemorySurfaceFactory {
    type Handle = u64;

    fn create(&mut self, bounds: ScreenRect) -> Result<Self::Handle, SurfaceError> {
        let live = self.live_count();
        if let Some(capacity) = self.capacity {
            if live >= capacity {
                return Err(SurfaceError::Exhausted { live });
            }
        }
        let handle = self.records.len() as u64;
        self.records.push(SurfaceRecord {
            bounds,
            alive: true,
        });
        self.created += 1;
        Ok(handle)
    }

    fn destroy(&mut self, handle: &mut Self::Handle) -> Result<(), SurfaceError> {
        let record = self
            .records
            .get_mut(*handle as usize)
            .ok_or(SurfaceError::StaleHandle(*handle))?;
        // Idempotent: a second destroy of the same surface is a no-op.
        if record.alive {
            record.alive = false;
            self.destroyed += 1;
        }
        Ok(())
    }

    fn set_bounds(
        &mut self,
        handle: &mut Self::Handle,
        bounds: ScreenRect,
    ) -> Result<(), SurfaceError> {
        let record = self
            .records
            .get_mut(*handle as usize)
            .ok_or(SurfaceError::StaleHandle(*handle))?;
        if !record.alive {
            return Err(SurfaceError::StaleHandle(*handle));
        }
        record.bounds = bounds;
        self.repositioned += 1;
        Ok(())
    }

    fn get_bounds(&self, handle: &Self::Handle) -> ScreenRect {
        self.records
            .get(*handle as usize)
            .map(|r| r.bounds)
            .unwrap_or(ScreenRect::EMPTY)
    }
}
