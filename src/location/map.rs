//! Adapter over the provider's map capability set.

use super::types::{Geometry, Position, Viewport};

/// The subset of the provider's map object the core drives.
pub trait MapSurface {
    fn set_center(&mut self, center: Position);
    fn fit_bounds(&mut self, bounds: Viewport);
    fn pan_to(&mut self, center: Position);
}

/// Owns a map surface and exposes place-level operations on it.
pub struct MapAdapter<S: MapSurface> {
    surface: S,
}

impl<S: MapSurface> MapAdapter<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    /// Frame a place: fit its viewport when it has one, otherwise center on it.
    pub fn show_place(&mut self, geometry: &Geometry) -> &mut Self {
        match geometry.viewport {
            Some(viewport) => self.surface.fit_bounds(viewport),
            None => {
                self.surface.set_center(geometry.location);
                self.surface.pan_to(geometry.location);
            }
        }
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
