//! Per-frame advance of the ball through the level
//!
//! Each frame the ball's travel is swept against every obstacle, the earliest
//! collision is resolved, and the rest of the frame is swept again from the
//! contact point. Several bounces can happen in one frame, which is what keeps
//! a fast ball from passing through thin blocks.

use serde::{Deserialize, Serialize};

use super::collision::{CollisionRecord, detect};
use super::state::{Ball, Block, ObstacleId};
use crate::settings::{ReflectionMode, Settings};

/// Result of advancing one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    StillFlying,
    /// The earliest collision was with the goal; the frame stops there
    TargetReached,
}

/// One level's worth of physics state: a ball, a goal and the level blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    ball: Ball,
    goal: Block,
    /// Collision priority follows this order, after the goal
    blocks: Vec<Block>,
    reflection: ReflectionMode,
    max_bounces: u32,
    min_fraction: f64,
}

impl Simulation {
    pub fn new(ball: Ball, goal: Block, blocks: Vec<Block>) -> Self {
        Self::with_settings(ball, goal, blocks, &Settings::default())
    }

    pub fn with_settings(ball: Ball, goal: Block, blocks: Vec<Block>, settings: &Settings) -> Self {
        Self {
            ball,
            goal,
            blocks,
            reflection: settings.reflection,
            max_bounces: settings.max_bounces_per_frame,
            min_fraction: settings.min_frame_fraction,
        }
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn goal(&self) -> &Block {
        &self.goal
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&Block> {
        match id {
            ObstacleId::Goal => Some(&self.goal),
            ObstacleId::Block(i) => self.blocks.get(i),
        }
    }

    /// All obstacles in collision priority order: goal first, then blocks
    pub fn obstacles(&self) -> impl Iterator<Item = (ObstacleId, &Block)> {
        std::iter::once((ObstacleId::Goal, &self.goal)).chain(
            self.blocks
                .iter()
                .enumerate()
                .map(|(i, block)| (ObstacleId::Block(i), block)),
        )
    }

    /// Hand the ball its launch velocity
    pub fn launch(&mut self, x: f64, y: f64) {
        log::info!("Launching ball with velocity ({:.2}, {:.2})", x, y);
        self.ball.set_velocity(x, y);
    }

    /// Find the earliest collision for `portion` of a frame's travel
    pub fn detect_all(&self, portion: f64) -> CollisionRecord {
        let mut record = CollisionRecord::new();
        for (id, block) in self.obstacles() {
            detect(&self.ball, portion, id, &block.bounds(), &mut record);
        }
        record
    }

    /// Advance the ball by `frame_fraction` of a frame (normally 1.0),
    /// resolving every bounce along the way.
    ///
    /// Gravity is applied during every partial move, including the short
    /// ones that end at a contact point. Fractions below the configured
    /// minimum leave the ball untouched. After `max_bounces` bounces in one
    /// call the ball stays where it is and the rest of the frame is dropped.
    pub fn advance(&mut self, frame_fraction: f64) -> StepOutcome {
        let mut remaining = frame_fraction;
        let mut bounces = 0;

        loop {
            if remaining.is_nan() || remaining < self.min_fraction {
                return StepOutcome::StillFlying;
            }

            let record = self.detect_all(remaining);
            let Some(&contact) = record.hit() else {
                self.ball.integrate(remaining);
                return StepOutcome::StillFlying;
            };

            if record.is_goal() {
                log::info!("Goal reached after {} bounce(s) this frame", bounces);
                return StepOutcome::TargetReached;
            }

            if bounces >= self.max_bounces {
                log::warn!(
                    "Bounce cap of {} reached; dropping {:.6} of the frame",
                    self.max_bounces,
                    remaining
                );
                return StepOutcome::StillFlying;
            }

            let step = contact.time_fraction * remaining;
            self.ball.integrate(step);
            self.ball.reflect(contact.normal, contact.obstacle, self.reflection);
            log::debug!(
                "Bounce off {:?} at {:.4} of {:.4}, normal ({:.3}, {:.3})",
                contact.obstacle,
                contact.time_fraction,
                remaining,
                contact.normal.x,
                contact.normal.y
            );

            remaining -= step;
            bounces += 1;
        }
    }
}
