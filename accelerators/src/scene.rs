//! Scene

use crate::accel::*;
use rtcore::error::*;
use rtcore::geometry::*;
use rtcore::pbrt::*;
use std::collections::BTreeSet;
use std::sync::{Mutex, RwLock};

/// Number of geometries of each kind in a scene.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GeometryCounts {
    /// Instances with a single time step.
    pub num_instances: usize,

    /// Instances with motion blur.
    pub num_mb_instances: usize,
}

impl GeometryCounts {
    /// Returns the total number of instances.
    pub fn total_instances(&self) -> usize {
        self.num_instances + self.num_mb_instances
    }
}

/// A scene holds the ids of geometries attached to it and the bounds of its
/// committed contents. Scenes are instanced through the `Accel` trait.
#[derive(Debug)]
pub struct Scene {
    /// Bounds of the committed contents over `[0, 1]`.
    bounds: RwLock<LBounds3f>,

    /// Ids of attached geometries.
    geometries: Mutex<BTreeSet<u32>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene. Its bounds are empty.
    pub fn new() -> Self {
        Self {
            bounds: RwLock::new(LBounds3f::EMPTY),
            geometries: Mutex::new(BTreeSet::new()),
        }
    }

    /// Sets the bounds of static contents.
    ///
    /// * `bounds` - The bounds.
    pub fn set_bounds(&self, bounds: Bounds3f) {
        self.set_linear_bounds(LBounds3f::from(bounds));
    }

    /// Sets the bounds of moving contents.
    ///
    /// * `bounds` - Bounds at times 0 and 1.
    pub fn set_linear_bounds(&self, bounds: LBounds3f) {
        let mut b = self.bounds.write().unwrap_or_else(|e| e.into_inner());
        *b = bounds;
    }

    /// Registers a geometry id.
    ///
    /// * `geom_id` - The geometry id.
    pub fn register_geometry(&self, geom_id: u32) -> Result<()> {
        let mut geometries = self.geometries.lock().unwrap_or_else(|e| e.into_inner());
        if !geometries.insert(geom_id) {
            return invalid_operation(format!("geometry id {} is already in use", geom_id));
        }
        debug!("Registered geometry {}", geom_id);
        Ok(())
    }

    /// Unregisters a geometry id. Returns false if the id was not registered.
    ///
    /// * `geom_id` - The geometry id.
    pub fn unregister_geometry(&self, geom_id: u32) -> bool {
        let removed = self
            .geometries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&geom_id);
        if removed {
            debug!("Unregistered geometry {}", geom_id);
        }
        removed
    }

    /// Returns true if a geometry id is registered.
    ///
    /// * `geom_id` - The geometry id.
    pub fn is_registered(&self, geom_id: u32) -> bool {
        self.geometries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&geom_id)
    }

    /// Returns the number of registered geometries.
    pub fn num_geometries(&self) -> usize {
        self.geometries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Accel for Scene {
    fn linear_bounds(&self) -> LBounds3f {
        *self.bounds.read().unwrap_or_else(|e| e.into_inner())
    }

    fn bounds_at(&self, time: Float) -> Bounds3f {
        let b = self.linear_bounds();
        if b.bounds0 == b.bounds1 {
            b.bounds0
        } else {
            b.interpolate(time)
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
