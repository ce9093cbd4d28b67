//! Simulation module
//!
//! All physics and gameplay logic lives here. This module must be pure:
//! - Caller-driven frame pump only (no clocks, no threads)
//! - Stable obstacle order (goal first, then level blocks as loaded)
//! - No rendering, input or file system dependencies

pub mod collision;
pub mod engine;
pub mod state;
pub mod tick;
pub mod vector;

pub use collision::{CollisionRecord, detect, line_corner_collide, lines_cross};
pub use engine::{Simulation, StepOutcome};
pub use state::{Ball, Block, Bounds, ObstacleId};
pub use tick::{GameEvent, GamePhase, GameState, Launcher, TickInput, tick};
pub use vector::VectorExt;
