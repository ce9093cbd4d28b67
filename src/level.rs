//! Level descriptions
//!
//! A level is a ball, a goal and any number of blocks. Levels are stored as
//! plain text, one record per line:
//!
//! ```text
//! 400 300 10 1        ball: centre x, centre y, radius, inverse mass
//! 700 500 40 40 0     goal: x, y, width, height, inverse mass
//! 0 0 800 10 0        blocks: x, y, width, height, inverse mass
//! ```
//!
//! Only the number sequence matters; line breaks are not significant.
//! Campaigns are directories of `lvl1.txt`, `lvl2.txt`, ... and end at the
//! first missing file. Files ending in `.json` hold a serialized [`Level`].

use std::path::{Path, PathBuf};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::{Ball, Block, Simulation};

const BALL_FIELDS: usize = 4;
const BLOCK_FIELDS: usize = 5;

/// Ways that reading a level can fail
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A token that is not a number (index counts from 1)
    #[error("value #{index} ({token:?}) is not a number")]
    InvalidNumber { index: usize, token: String },
    #[error("value #{index} is not finite")]
    NonFinite { index: usize },
    #[error("level is missing its {0} record")]
    MissingRecord(&'static str),
    #[error("{0} trailing value(s) do not form a complete block record")]
    TrailingValues(usize),
    #[error("ball radius must be positive, got {0}")]
    InvalidRadius(f64),
    #[error("{what} has non-positive size {width} x {height}")]
    InvalidSize { what: String, width: f64, height: f64 },
    #[error("{what} has negative inverse mass {value}")]
    NegativeInverseMass { what: String, value: f64 },
    #[error("invalid JSON level: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ball record; `x` and `y` are the centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallRecord {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub inverse_mass: f64,
}

/// Rectangle record; `x` and `y` are the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub inverse_mass: f64,
}

impl BlockRecord {
    fn to_block(self) -> Block {
        Block::new(self.x, self.y, self.width, self.height)
    }

    /// Values are already known to be finite
    fn validate(&self, what: String) -> Result<(), LevelError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(LevelError::InvalidSize {
                what,
                width: self.width,
                height: self.height,
            });
        }
        if self.inverse_mass < 0.0 {
            return Err(LevelError::NegativeInverseMass {
                what,
                value: self.inverse_mass,
            });
        }
        Ok(())
    }
}

/// A parsed, validated level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub ball: BallRecord,
    pub goal: BlockRecord,
    /// Order is collision priority
    #[serde(default)]
    pub blocks: Vec<BlockRecord>,
}

impl Level {
    /// Parse the plain-text level format
    pub fn parse(text: &str) -> Result<Self, LevelError> {
        let values = text
            .split_whitespace()
            .enumerate()
            .map(|(i, token)| {
                let index = i + 1;
                let value: f64 = token.parse().map_err(|_| LevelError::InvalidNumber {
                    index,
                    token: token.to_string(),
                })?;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(LevelError::NonFinite { index })
                }
            })
            .collect::<Result<Vec<f64>, _>>()?;

        if values.len() < BALL_FIELDS {
            return Err(LevelError::MissingRecord("ball"));
        }
        let (ball, rest) = values.split_at(BALL_FIELDS);
        if rest.len() < BLOCK_FIELDS {
            return Err(LevelError::MissingRecord("goal"));
        }
        let (goal, rest) = rest.split_at(BLOCK_FIELDS);

        let chunks = rest.chunks_exact(BLOCK_FIELDS);
        if !chunks.remainder().is_empty() {
            return Err(LevelError::TrailingValues(chunks.remainder().len()));
        }

        let level = Level {
            ball: BallRecord {
                x: ball[0],
                y: ball[1],
                radius: ball[2],
                inverse_mass: ball[3],
            },
            goal: block_record(goal),
            blocks: chunks.map(block_record).collect(),
        };
        level.validate()?;
        Ok(level)
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Level = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Read a level file, choosing the format by extension
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&text)
        } else {
            Self::parse(&text)
        }
    }

    /// Reject geometry the engine cannot handle
    pub fn validate(&self) -> Result<(), LevelError> {
        let ball = &self.ball;
        let all = [ball.x, ball.y, ball.radius, ball.inverse_mass]
            .into_iter()
            .chain(std::iter::once(&self.goal).chain(&self.blocks).flat_map(|b| {
                [b.x, b.y, b.width, b.height, b.inverse_mass]
            }));
        if let Some(i) = all.into_iter().position(|v| !v.is_finite()) {
            return Err(LevelError::NonFinite { index: i + 1 });
        }

        if ball.radius <= 0.0 {
            return Err(LevelError::InvalidRadius(ball.radius));
        }
        if ball.inverse_mass < 0.0 {
            return Err(LevelError::NegativeInverseMass {
                what: "ball".to_string(),
                value: ball.inverse_mass,
            });
        }
        self.goal.validate("goal".to_string())?;
        for (i, block) in self.blocks.iter().enumerate() {
            block.validate(format!("block {}", i + 1))?;
        }
        Ok(())
    }

    /// Build a fresh simulation for this level
    pub fn build(&self, settings: &Settings) -> Simulation {
        let ball = Ball::from_center(
            DVec2::new(self.ball.x, self.ball.y),
            self.ball.radius,
            self.ball.inverse_mass,
        );
        let blocks = self.blocks.iter().map(|b| b.to_block()).collect();
        Simulation::with_settings(ball, self.goal.to_block(), blocks, settings)
    }
}

fn block_record(values: &[f64]) -> BlockRecord {
    BlockRecord {
        x: values[0],
        y: values[1],
        width: values[2],
        height: values[3],
        inverse_mass: values[4],
    }
}

/// File name of the `number`th level (1-based)
pub fn level_file_name(number: usize) -> String {
    format!("lvl{number}.txt")
}

/// Load `lvl1.txt`, `lvl2.txt`, ... from `dir` until the first missing file
pub fn load_campaign(dir: &Path) -> Result<Vec<Level>, LevelError> {
    let mut levels = Vec::new();
    loop {
        let path = dir.join(level_file_name(levels.len() + 1));
        if !path.is_file() {
            break;
        }
        levels.push(Level::load(&path)?);
    }
    log::info!("Loaded {} level(s) from {}", levels.len(), dir.display());
    Ok(levels)
}
