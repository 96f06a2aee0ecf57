//! Engine settings
//!
//! Persisted in LocalStorage on the web, defaults everywhere else.

use serde::{Deserialize, Serialize};

use crate::path::PathStrategy;
use crate::sim::{GuidanceCurve, PhysicsParams};

/// How a drop is animated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnimationMode {
    /// Play the synthesized path back row by row
    Simple,
    /// Guided peg physics
    #[default]
    Realistic,
}

impl AnimationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationMode::Simple => "Simple",
            AnimationMode::Realistic => "Realistic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "simple" | "path" => Some(AnimationMode::Simple),
            "realistic" | "physics" => Some(AnimationMode::Realistic),
            _ => None,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub animation: AnimationMode,
    pub path_strategy: PathStrategy,

    // === Balls ===
    /// Allow a new drop while another ball is still falling
    pub allow_concurrent_balls: bool,
    /// Cap on balls in flight when concurrent drops are allowed
    pub max_balls: usize,

    // === Simple mode ===
    /// Seconds per peg row
    pub path_step_secs: f32,

    // === Realistic mode ===
    pub physics: PhysicsParams,
    pub guidance: GuidanceCurve,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            animation: AnimationMode::Realistic,
            path_strategy: PathStrategy::GoalBiased,

            allow_concurrent_balls: true,
            max_balls: 50,

            path_step_secs: 0.12,

            physics: PhysicsParams::default(),
            guidance: GuidanceCurve::default(),
        }
    }
}

impl EngineSettings {
    /// One ball at a time (a drop is rejected while a ball is falling)
    pub fn single_ball() -> Self {
        Self {
            allow_concurrent_balls: false,
            max_balls: 1,
            ..Self::default()
        }
    }

    /// Most balls that may be in flight at once
    pub fn ball_limit(&self) -> usize {
        if self.allow_concurrent_balls {
            self.max_balls.max(1)
        } else {
            1
        }
    }

    /// Parse settings JSON, falling back to defaults on any error
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed engine settings: {}", e);
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "plinko_engine_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded engine settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default engine settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match serde_json::to_string(self) {
                Ok(json) => {
                    if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                        log::warn!("Failed to write engine settings");
                    } else {
                        log::info!("Engine settings saved");
                    }
                }
                Err(e) => log::warn!("Failed to encode engine settings: {}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_mode_strings() {
        for mode in [AnimationMode::Simple, AnimationMode::Realistic] {
            assert_eq!(AnimationMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(AnimationMode::from_str("physics"), Some(AnimationMode::Realistic));
        assert_eq!(AnimationMode::from_str("teleport"), None);
    }

    #[test]
    fn test_ball_limit() {
        assert_eq!(EngineSettings::single_ball().ball_limit(), 1);
        let settings = EngineSettings {
            max_balls: 0,
            ..EngineSettings::default()
        };
        assert_eq!(settings.ball_limit(), 1);
        assert_eq!(EngineSettings::default().ball_limit(), 50);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = EngineSettings::from_json(r#"{"animation":"Simple","max_balls":3}"#);
        assert_eq!(settings.animation, AnimationMode::Simple);
        assert_eq!(settings.max_balls, 3);
        assert_eq!(settings.physics, PhysicsParams::default());
    }

    #[test]
    fn test_malformed_json_defaults() {
        assert_eq!(EngineSettings::from_json("{not json"), EngineSettings::default());
    }

    #[test]
    fn test_json_round_trip() {
        let settings = EngineSettings::single_ball();
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(EngineSettings::from_json(&json), settings);
    }
}
