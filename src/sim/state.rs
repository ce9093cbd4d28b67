//! Bodies and obstacles
//!
//! The ball is the only thing that moves. Blocks never change after a level
//! is built; the goal is an ordinary block whose role is decided by where the
//! simulation stores it.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::vector::VectorExt;
use crate::consts::*;
use crate::settings::ReflectionMode;

/// Which obstacle a collision belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleId {
    /// The target rectangle
    Goal,
    /// Index into the simulation's ordered level blocks
    Block(usize),
}

impl ObstacleId {
    pub fn is_goal(self) -> bool {
        self == ObstacleId::Goal
    }
}

/// The launched ball (a non-rotating point-mass circle)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Top-left corner of the bounding box
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    inverse_mass: f64,
}

impl Ball {
    /// Create a resting ball whose bounding box starts at `pos`
    pub fn new(pos: DVec2, radius: f64, inverse_mass: f64) -> Self {
        let mut ball = Self {
            pos,
            vel: DVec2::ZERO,
            radius,
            inverse_mass: 0.0,
        };
        ball.set_inverse_mass(inverse_mass);
        ball
    }

    /// Create a resting ball centred on `center`
    pub fn from_center(center: DVec2, radius: f64, inverse_mass: f64) -> Self {
        Self::new(center - DVec2::splat(radius), radius, inverse_mass)
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        self.pos + DVec2::splat(self.radius)
    }

    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    /// Negative values are ignored and the previous inverse mass is kept
    pub fn set_inverse_mass(&mut self, inverse_mass: f64) {
        if inverse_mass >= 0.0 {
            self.inverse_mass = inverse_mass;
        }
    }

    pub fn set_velocity(&mut self, x: f64, y: f64) {
        self.vel.set_xy(x, y);
    }

    /// Whether the ball has been given any velocity yet
    pub fn is_moving(&self) -> bool {
        self.vel != DVec2::ZERO
    }

    /// Explicit Euler step of constant downward gravity (y grows downward)
    pub fn apply_gravity(&mut self, fraction: f64) {
        let (_, y) = self.vel.components();
        self.vel.set_y(y + GRAVITY * fraction);
    }

    /// Move along the velocity for `fraction` of a frame, then apply gravity
    /// for the same share.
    pub fn integrate(&mut self, fraction: f64) {
        self.pos += self.vel * fraction;
        self.apply_gravity(fraction);
    }

    /// Bounce off a surface with the given contact normal.
    ///
    /// The velocity direction is mirrored across the normal and each axis
    /// keeps `1 - 0.15 * |n|` of the incoming speed on that axis, so a head-on
    /// hit loses 15% along the normal and nothing along the surface.
    pub fn reflect(&mut self, normal: DVec2, struck: ObstacleId, mode: ReflectionMode) {
        let (vx, vy) = self.vel.components();
        let (nx, ny) = normal.components();

        let flipped_angle = (-self.vel).direction_angle();
        let normal_angle = normal.direction_angle();
        let reflected_angle = flipped_angle + 2.0 * (normal_angle - flipped_angle);

        let speed = vx.hypot(vy);
        let new_vx = (1.0 - BOUNCE_DAMPING * nx.abs()) * reflected_angle.cos() * speed;
        let new_vy = match mode {
            ReflectionMode::Consistent => {
                (1.0 - BOUNCE_DAMPING * ny.abs()) * reflected_angle.sin() * speed
            }
            // Speed for the y axis is taken after x has already been replaced
            ReflectionMode::Legacy => {
                (1.0 - BOUNCE_DAMPING * ny.abs()) * reflected_angle.sin() * new_vx.hypot(vy)
            }
        };

        log::trace!(
            "reflect off {:?}: ({:.3}, {:.3}) -> ({:.3}, {:.3})",
            struck,
            vx,
            vy,
            new_vx,
            new_vy
        );
        self.set_velocity(new_vx, new_vy);
    }
}

/// Inclusive pixel bounds of a block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Bounds {
    /// Grow the bounds outward by `margin` on every side
    pub fn expanded(&self, margin: f64) -> Bounds {
        Bounds {
            x_min: self.x_min - margin,
            y_min: self.y_min - margin,
            x_max: self.x_max + margin,
            y_max: self.y_max + margin,
        }
    }
}

/// An immovable axis-aligned rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Top-left corner
    pub pos: DVec2,
    pub width: f64,
    pub height: f64,
}

impl Block {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            pos: DVec2::new(x, y),
            width,
            height,
        }
    }

    /// Bounds with the inclusive-pixel convention: the far edges sit at
    /// `min + size - 1`.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            x_min: self.pos.x,
            y_min: self.pos.y,
            x_max: self.pos.x + self.width - 1.0,
            y_max: self.pos.y + self.height - 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ball_center_from_top_left() {
        let ball = Ball::from_center(DVec2::new(50.0, 60.0), 5.0, 1.0);
        assert_eq!(ball.pos, DVec2::new(45.0, 55.0));
        assert_eq!(ball.center(), DVec2::new(50.0, 60.0));
    }

    #[test]
    fn test_negative_inverse_mass_ignored() {
        let mut ball = Ball::new(DVec2::ZERO, 5.0, 2.0);
        ball.set_inverse_mass(-1.0);
        assert_eq!(ball.inverse_mass(), 2.0);
        ball.set_inverse_mass(0.0);
        assert_eq!(ball.inverse_mass(), 0.0);

        let fresh = Ball::new(DVec2::ZERO, 5.0, -3.0);
        assert_eq!(fresh.inverse_mass(), 0.0);
    }

    #[test]
    fn test_integrate_moves_then_applies_gravity() {
        let mut ball = Ball::new(DVec2::new(10.0, 10.0), 5.0, 1.0);
        ball.set_velocity(4.0, -2.0);
        ball.integrate(0.5);
        // Position uses the velocity from before gravity
        assert_eq!(ball.pos, DVec2::new(12.0, 9.0));
        assert_eq!(ball.vel, DVec2::new(4.0, -1.0));
    }

    #[test]
    fn test_reflect_head_on_wall() {
        let mut ball = Ball::new(DVec2::ZERO, 5.0, 1.0);
        ball.set_velocity(20.0, 0.0);
        ball.reflect(DVec2::new(-1.0, 0.0), ObstacleId::Block(0), ReflectionMode::Consistent);
        assert!(approx(ball.vel.x, -17.0));
        assert!(ball.vel.y.abs() < 1e-9);
    }

    #[test]
    fn test_reflect_floor_keeps_horizontal_speed() {
        let mut ball = Ball::new(DVec2::ZERO, 5.0, 1.0);
        ball.set_velocity(3.0, 4.0);
        ball.reflect(DVec2::new(0.0, -1.0), ObstacleId::Block(0), ReflectionMode::Consistent);
        assert!(approx(ball.vel.x, 3.0));
        assert!(approx(ball.vel.y, -4.0 * 0.85));
    }

    #[test]
    fn test_reflect_legacy_uses_replaced_x_for_y_speed() {
        let mut consistent = Ball::new(DVec2::ZERO, 5.0, 1.0);
        consistent.set_velocity(3.0, 4.0);
        let mut legacy = consistent.clone();

        let normal = DVec2::new(-1.0, 0.0);
        consistent.reflect(normal, ObstacleId::Block(0), ReflectionMode::Consistent);
        legacy.reflect(normal, ObstacleId::Block(0), ReflectionMode::Legacy);

        // x is computed identically in both modes
        assert!(approx(consistent.vel.x, -0.85 * 3.0));
        assert!(approx(legacy.vel.x, consistent.vel.x));

        assert!(approx(consistent.vel.y, 4.0));
        // y speed comes from hypot(new_vx, old_vy) instead of the incoming speed
        let legacy_speed = (0.85_f64 * 3.0).hypot(4.0);
        assert!(approx(legacy.vel.y, 0.8 * legacy_speed));
        assert!(legacy.vel.y < consistent.vel.y);
    }

    #[test]
    fn test_reflect_zero_velocity_stays_finite() {
        let mut ball = Ball::new(DVec2::ZERO, 5.0, 1.0);
        ball.reflect(DVec2::new(0.6, -0.8), ObstacleId::Block(3), ReflectionMode::Legacy);
        assert!(ball.vel.is_finite());
        assert_eq!(ball.vel, DVec2::ZERO);
    }

    #[test]
    fn test_block_bounds_inclusive() {
        let block = Block::new(20.0, -50.0, 21.0, 101.0);
        let b = block.bounds();
        assert_eq!((b.x_min, b.y_min, b.x_max, b.y_max), (20.0, -50.0, 40.0, 50.0));

        let e = b.expanded(5.0);
        assert_eq!((e.x_min, e.y_min, e.x_max, e.y_max), (15.0, -55.0, 45.0, 55.0));
    }
}
