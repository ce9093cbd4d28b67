//! Physics and runtime settings
//!
//! Loaded from an optional JSON file; every field falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How a bounce recomputes the y component's speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReflectionMode {
    /// Both components use the incoming speed
    #[default]
    Consistent,
    /// The y component uses a speed recomputed from the already-replaced x
    /// component, as the first release of the game did
    Legacy,
}

impl ReflectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReflectionMode::Consistent => "consistent",
            ReflectionMode::Legacy => "legacy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "consistent" | "fixed" => Some(ReflectionMode::Consistent),
            "legacy" => Some(ReflectionMode::Legacy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bounce reflection variant
    pub reflection: ReflectionMode,

    // === Engine guards ===
    /// Bounces resolved in one frame before the rest of the frame is dropped
    pub max_bounces_per_frame: u32,
    /// Frame fractions below this are not advanced
    pub min_frame_fraction: f64,

    // === Frame pump / launcher ===
    /// Milliseconds between ticks when running in real time
    pub tick_interval_ms: u64,
    /// Launcher magnitude ceiling
    pub max_velocity: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reflection: ReflectionMode::Consistent,
            max_bounces_per_frame: MAX_BOUNCES_PER_FRAME,
            min_frame_fraction: MIN_FRAME_FRACTION,
            tick_interval_ms: TICK_INTERVAL_MS,
            max_velocity: MAX_VELOCITY,
        }
    }
}

impl Settings {
    /// Parse settings; out-of-range values fall back to their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::validated)
    }

    /// Replace values the engine cannot run with by their defaults.
    ///
    /// `max_velocity` must be positive and finite, `min_frame_fraction` must
    /// lie strictly between 0 and 1.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.max_velocity.is_finite() && self.max_velocity > 0.0) {
            log::warn!(
                "Invalid max_velocity {}; using {}",
                self.max_velocity,
                defaults.max_velocity
            );
            self.max_velocity = defaults.max_velocity;
        }
        if !(self.min_frame_fraction > 0.0 && self.min_frame_fraction < 1.0) {
            log::warn!(
                "Invalid min_frame_fraction {}; using {}",
                self.min_frame_fraction,
                defaults.min_frame_fraction
            );
            self.min_frame_fraction = defaults.min_frame_fraction;
        }
        self
    }

    /// Load settings from a JSON file, falling back to defaults when the
    /// file is missing or unreadable
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "reflection": "legacy" }"#).unwrap();
        assert_eq!(settings.reflection, ReflectionMode::Legacy);
        assert_eq!(settings.max_bounces_per_frame, MAX_BOUNCES_PER_FRAME);
        assert_eq!(settings.max_velocity, MAX_VELOCITY);
    }

    #[test]
    fn test_reflection_mode_names() {
        assert_eq!(ReflectionMode::from_str("LEGACY"), Some(ReflectionMode::Legacy));
        assert_eq!(ReflectionMode::from_str("fixed"), Some(ReflectionMode::Consistent));
        assert_eq!(ReflectionMode::from_str("bouncy"), None);
        assert_eq!(ReflectionMode::Legacy.as_str(), "legacy");
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(&dir.path().join("missing.json")), Settings::default());

        let path = dir.path().join("broken.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let json = r#"{ "max_bounces_per_frame": 8, "tick_interval_ms": 16 }"#;
        std::fs::write(&path, json).unwrap();

        let settings = Settings::load(&path);
        assert_eq!(settings.max_bounces_per_frame, 8);
        assert_eq!(settings.tick_interval_ms, 16);
        assert_eq!(settings.reflection, ReflectionMode::Consistent);
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let settings = Settings::from_json(r#"{ "max_velocity": -10 }"#).unwrap();
        assert_eq!(settings.max_velocity, MAX_VELOCITY);

        let settings =
            Settings::from_json(r#"{ "min_frame_fraction": 2.0, "max_velocity": 30 }"#).unwrap();
        assert_eq!(settings.min_frame_fraction, MIN_FRAME_FRACTION);
        assert_eq!(settings.max_velocity, 30.0);

        let settings = Settings {
            max_velocity: f64::NAN,
            min_frame_fraction: 0.0,
            ..Default::default()
        }
        .validated();
        assert_eq!(settings, Settings::default());
    }
}
