//! Launch Bounce - physics core for a 2D launch-and-bounce puzzle
//!
//! Core modules:
//! - `sim`: Continuous collision detection, bounce resolution and the game controller
//! - `level`: Level descriptions and the plain-text level format
//! - `settings`: Tunable physics and runtime settings

pub mod level;
pub mod settings;
pub mod sim;

pub use level::{Level, LevelError};
pub use settings::{ReflectionMode, Settings};

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Downward acceleration, in velocity units per unit of frame time
    pub const GRAVITY: f64 = 2.0;
    /// Fraction of the normal-aligned velocity lost on each bounce
    pub const BOUNCE_DAMPING: f64 = 0.15;

    /// Corner roots at or below this position along the travel segment are ignored
    pub const CORNER_START_EPSILON: f64 = 0.001;
    /// Frame fractions below this are not advanced at all
    pub const MIN_FRAME_FRACTION: f64 = 1e-9;
    /// Maximum bounces resolved inside a single frame
    pub const MAX_BOUNCES_PER_FRAME: u32 = 64;

    /// Launcher defaults
    pub const MAX_VELOCITY: f64 = 50.0;
    pub const MAX_PATH_LENGTH: f64 = 80.0;

    /// Frame pump cadence (milliseconds between ticks)
    pub const TICK_INTERVAL_MS: u64 = 35;
}

/// Wrap an angle in whole degrees into [0, 360)
#[inline]
pub fn wrap_degrees(angle: i32) -> u32 {
    angle.rem_euclid(360) as u32
}

/// Convert polar (r, degrees) to cartesian (x, y), with y growing downward
#[inline]
pub fn polar_to_cartesian(r: f64, degrees: f64) -> DVec2 {
    let theta = degrees.to_radians();
    DVec2::new(r * theta.cos(), r * theta.sin())
}
