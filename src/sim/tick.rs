//! Per-tick game controller
//!
//! Drives the engine the way the frame pump expects: while aiming, input
//! adjusts the launcher; once launched, every tick advances the simulation by
//! one full frame. Reaching the goal moves on to the next level.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::engine::{Simulation, StepOutcome};
use crate::consts::*;
use crate::level::Level;
use crate::settings::Settings;
use crate::{polar_to_cartesian, wrap_degrees};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Degrees to turn the launcher (positive turns clockwise on screen)
    pub angle_delta: i32,
    /// Power steps of 1% of the maximum velocity
    pub power_delta: i32,
    /// Fire the ball
    pub launch: bool,
    /// Pause toggle (only while the ball is flying)
    pub pause: bool,
    /// Restart the current level (only once the ball has been launched)
    pub reset: bool,
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball at rest, launcher adjustable
    Aiming,
    /// Ball in flight, engine advancing every tick
    Flying,
    /// Flight suspended
    Paused,
    /// Every level has been cleared
    GameOver,
}

/// Things that happened during a tick, for the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Launched,
    /// `level` is the 1-based number of the level just won
    LevelWon { level: usize },
    GameOver,
    Reset,
    Paused,
    Resumed,
}

/// Launch angle and power chosen before firing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Launcher {
    /// Whole degrees in [0, 360), measured with y growing downward
    pub angle: u32,
    /// Launch speed in [0, max_velocity]
    pub magnitude: f64,
    pub max_velocity: f64,
}

impl Launcher {
    pub fn new(max_velocity: f64) -> Self {
        Self {
            angle: 0,
            magnitude: max_velocity / 2.0,
            max_velocity,
        }
    }

    pub fn rotate(&mut self, degrees: i32) {
        self.angle = wrap_degrees(self.angle as i32 + degrees.rem_euclid(360));
    }

    pub fn adjust_power(&mut self, steps: i32) {
        self.set_magnitude(self.magnitude + steps as f64 * self.max_velocity / 100.0);
    }

    pub fn set_angle(&mut self, degrees: i32) {
        self.angle = wrap_degrees(degrees);
    }

    pub fn set_magnitude(&mut self, magnitude: f64) {
        self.magnitude = magnitude.clamp(0.0, self.max_velocity.max(0.0));
    }

    pub fn set_power_percent(&mut self, percent: f64) {
        self.set_magnitude(percent * self.max_velocity / 100.0);
    }

    pub fn power_percent(&self) -> f64 {
        100.0 * self.magnitude / self.max_velocity
    }

    /// Angle as a player reads it, counter-clockwise from the right
    pub fn display_angle(&self) -> u32 {
        (360 - self.angle) % 360
    }

    pub fn velocity(&self) -> DVec2 {
        polar_to_cartesian(self.magnitude, self.angle as f64)
    }

    /// Aim guide from `origin`, longer for more power
    pub fn guide(&self, origin: DVec2) -> (DVec2, DVec2) {
        let length = (self.magnitude + 10.0) * MAX_PATH_LENGTH / self.max_velocity;
        (origin, origin + polar_to_cartesian(length, self.angle as f64))
    }

    pub fn status_line(&self) -> String {
        format!(
            "Launch with {:.0}% power at {} degrees.",
            self.power_percent(),
            self.display_angle()
        )
    }
}

/// A campaign in progress
#[derive(Debug, Clone)]
pub struct GameState {
    levels: Vec<Level>,
    /// 0-based index into `levels`
    level_index: usize,
    pub phase: GamePhase,
    pub launcher: Launcher,
    /// `None` once the campaign is over
    sim: Option<Simulation>,
    settings: Settings,
    /// Ticks spent flying, across all levels
    pub flight_ticks: u64,
}

impl GameState {
    /// Start the campaign at `start_index` (0-based)
    pub fn new(levels: Vec<Level>, start_index: usize, settings: Settings) -> Self {
        let settings = settings.validated();
        let mut state = Self {
            levels,
            level_index: start_index,
            phase: GamePhase::Aiming,
            launcher: Launcher::new(settings.max_velocity),
            sim: None,
            settings,
            flight_ticks: 0,
        };
        state.build_level();
        state
    }

    /// 1-based number of the current level
    pub fn level_number(&self) -> usize {
        self.level_index + 1
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.sim.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Set up the current level from scratch, or end the game if there is
    /// no such level
    fn build_level(&mut self) {
        self.launcher = Launcher::new(self.settings.max_velocity);
        match self.levels.get(self.level_index) {
            Some(level) => {
                log::info!("Building level {}", self.level_number());
                self.sim = Some(level.build(&self.settings));
                self.phase = GamePhase::Aiming;
            }
            None => {
                log::info!("No level {}; game over", self.level_number());
                self.sim = None;
                self.phase = GamePhase::GameOver;
            }
        }
    }
}

/// Advance the game by one tick
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    match state.phase {
        GamePhase::Aiming => {
            state.launcher.rotate(input.angle_delta);
            state.launcher.adjust_power(input.power_delta);

            if input.launch {
                if let Some(sim) = state.sim.as_mut() {
                    let v = state.launcher.velocity();
                    sim.launch(v.x, v.y);
                    state.phase = GamePhase::Flying;
                    events.push(GameEvent::Launched);
                }
            }
        }

        GamePhase::Flying => {
            if input.reset {
                state.build_level();
                events.push(GameEvent::Reset);
                return events;
            }
            if input.pause {
                state.phase = GamePhase::Paused;
                events.push(GameEvent::Paused);
                return events;
            }

            let Some(sim) = state.sim.as_mut() else {
                return events;
            };
            state.flight_ticks += 1;
            if sim.advance(1.0) == StepOutcome::TargetReached {
                let won = state.level_number();
                log::info!("Level {} completed!", won);
                events.push(GameEvent::LevelWon { level: won });

                state.level_index += 1;
                state.build_level();
                if state.phase == GamePhase::GameOver {
                    events.push(GameEvent::GameOver);
                }
            }
        }

        GamePhase::Paused => {
            if input.reset {
                state.build_level();
                events.push(GameEvent::Reset);
            } else if input.pause {
                state.phase = GamePhase::Flying;
                events.push(GameEvent::Resumed);
            }
        }

        GamePhase::GameOver => {}
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ball at (100, 100) with the goal straight to the right
    fn goal_ahead() -> Level {
        Level::parse("100 100 5 1\n150 50 20 100 0\n").unwrap()
    }

    /// Ball at (100, 100) with a wall straight to the right and the goal far away
    fn wall_ahead() -> Level {
        Level::parse("100 100 5 1\n5000 5000 10 10 0\n150 0 20 200 0\n").unwrap()
    }

    fn launch() -> TickInput {
        TickInput {
            launch: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_launcher_defaults_and_limits() {
        let mut launcher = Launcher::new(MAX_VELOCITY);
        assert_eq!(launcher.angle, 0);
        assert_eq!(launcher.magnitude, 25.0);
        assert_eq!(launcher.status_line(), "Launch with 50% power at 0 degrees.");

        launcher.rotate(-1);
        assert_eq!(launcher.angle, 359);
        assert_eq!(launcher.display_angle(), 1);
        launcher.rotate(2);
        assert_eq!(launcher.angle, 1);

        launcher.adjust_power(1000);
        assert_eq!(launcher.magnitude, MAX_VELOCITY);
        launcher.adjust_power(-1000);
        assert_eq!(launcher.magnitude, 0.0);
        launcher.adjust_power(3);
        assert!((launcher.power_percent() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_launcher_velocity_and_guide() {
        let mut launcher = Launcher::new(MAX_VELOCITY);
        launcher.set_angle(90);
        launcher.set_magnitude(40.0);
        let v = launcher.velocity();
        assert!(v.x.abs() < 1e-9);
        assert!((v.y - 40.0).abs() < 1e-9);

        let (from, to) = launcher.guide(DVec2::new(10.0, 10.0));
        assert_eq!(from, DVec2::new(10.0, 10.0));
        assert!((to.y - (10.0 + 50.0 * MAX_PATH_LENGTH / MAX_VELOCITY)).abs() < 1e-9);
    }

    #[test]
    fn test_aiming_does_not_move_ball() {
        let mut state = GameState::new(vec![goal_ahead()], 0, Settings::default());
        let before = state.simulation().unwrap().ball().clone();

        let input = TickInput {
            angle_delta: 5,
            power_delta: -2,
            ..Default::default()
        };
        assert!(tick(&mut state, &input).is_empty());
        assert_eq!(state.phase, GamePhase::Aiming);
        assert_eq!(state.launcher.angle, 5);
        assert_eq!(state.simulation().unwrap().ball(), &before);
    }

    #[test]
    fn test_launch_then_win_then_game_over() {
        let mut state = GameState::new(vec![goal_ahead()], 0, Settings::default());

        assert_eq!(tick(&mut state, &launch()), vec![GameEvent::Launched]);
        assert_eq!(state.phase, GamePhase::Flying);
        assert_eq!(state.simulation().unwrap().ball().vel, DVec2::new(25.0, 0.0));

        let mut events = Vec::new();
        for _ in 0..10 {
            events.extend(tick(&mut state, &TickInput::default()));
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        assert_eq!(events, vec![GameEvent::LevelWon { level: 1 }, GameEvent::GameOver]);
        assert!(state.simulation().is_none());
        assert!(tick(&mut state, &launch()).is_empty());
    }

    #[test]
    fn test_win_advances_to_next_level() {
        let mut state = GameState::new(vec![goal_ahead(), wall_ahead()], 0, Settings::default());
        tick(&mut state, &launch());
        while state.level_number() == 1 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.level_number(), 2);
        assert_eq!(state.phase, GamePhase::Aiming);
        assert!(!state.simulation().unwrap().ball().is_moving());
    }

    #[test]
    fn test_pause_resume_and_reset() {
        let mut state = GameState::new(vec![wall_ahead()], 0, Settings::default());
        tick(&mut state, &launch());
        tick(&mut state, &TickInput::default());
        let flying = state.simulation().unwrap().ball().clone();

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &pause), vec![GameEvent::Paused]);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.simulation().unwrap().ball(), &flying);

        assert_eq!(tick(&mut state, &pause), vec![GameEvent::Resumed]);
        assert_eq!(state.phase, GamePhase::Flying);

        let reset = TickInput {
            reset: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &reset), vec![GameEvent::Reset]);
        assert_eq!(state.phase, GamePhase::Aiming);
        assert_eq!(state.simulation().unwrap().ball().center(), DVec2::new(100.0, 100.0));
    }

    #[test]
    fn test_reset_ignored_while_aiming() {
        let mut state = GameState::new(vec![wall_ahead()], 0, Settings::default());
        let reset = TickInput {
            reset: true,
            ..Default::default()
        };
        assert!(tick(&mut state, &reset).is_empty());
        assert_eq!(state.phase, GamePhase::Aiming);
    }

    #[test]
    fn test_wall_bounce_keeps_flying() {
        let mut state = GameState::new(vec![wall_ahead()], 0, Settings::default());
        tick(&mut state, &launch());
        for _ in 0..3 {
            assert!(tick(&mut state, &TickInput::default()).is_empty());
        }
        assert_eq!(state.flight_ticks, 3);
        // Wall border at x = 145; 25 per tick reaches it during the second tick
        assert!(state.simulation().unwrap().ball().vel.x < 0.0);
    }

    #[test]
    fn test_empty_campaign_is_over() {
        let state = GameState::new(Vec::new(), 0, Settings::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.level_number(), 1);
    }

    #[test]
    fn test_out_of_range_settings_still_play() {
        let settings = Settings {
            max_velocity: -10.0,
            min_frame_fraction: 2.0,
            ..Default::default()
        };
        let mut state = GameState::new(vec![wall_ahead()], 0, settings);
        assert_eq!(state.settings().max_velocity, MAX_VELOCITY);
        assert!(tick(&mut state, &TickInput::default()).is_empty());

        let before = state.simulation().unwrap().ball().clone();
        tick(&mut state, &launch());
        tick(&mut state, &TickInput::default());
        assert_ne!(state.simulation().unwrap().ball().pos, before.pos);
    }

    #[test]
    fn test_launcher_extreme_inputs() {
        let mut launcher = Launcher::new(MAX_VELOCITY);
        launcher.set_angle(10);
        launcher.rotate(i32::MAX);
        assert_eq!(launcher.angle, (10 + i32::MAX.rem_euclid(360)) as u32 % 360);
        launcher.rotate(i32::MIN);
        assert!(launcher.angle < 360);

        launcher.max_velocity = -1.0;
        launcher.set_magnitude(5.0);
        assert_eq!(launcher.magnitude, 0.0);
    }

    #[test]
    fn test_status_line_rounds_power() {
        let mut launcher = Launcher::new(51.0);
        launcher.adjust_power(1);
        assert_eq!(launcher.status_line(), "Launch with 51% power at 0 degrees.");
    }
}
