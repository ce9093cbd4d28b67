//! Two-component vector helpers
//!
//! Vectors are plain `glam::DVec2` values. This trait adds the small
//! in-place setters the bodies use plus the direction angle that bounce
//! reflection is built on. Angles are always derived from components,
//! never stored.

use glam::DVec2;

pub trait VectorExt {
    fn set_x(&mut self, x: f64);
    fn set_y(&mut self, y: f64);
    fn set_xy(&mut self, x: f64, y: f64);
    fn components(&self) -> (f64, f64);

    /// Direction of the vector in radians, quadrant-corrected.
    ///
    /// A zero vector has direction 0 rather than NaN.
    fn direction_angle(&self) -> f64;
}

impl VectorExt for DVec2 {
    #[inline]
    fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    #[inline]
    fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    #[inline]
    fn set_xy(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    #[inline]
    fn components(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    #[inline]
    fn direction_angle(&self) -> f64 {
        self.y.atan2(self.x)
    }
}
