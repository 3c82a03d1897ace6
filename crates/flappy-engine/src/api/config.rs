use serde::{Deserialize, Serialize};

use crate::api::error::EngineResult;

/// Gravity applied when the configuration does not name one.
/// Negative because `Entity::fall` subtracts gravity and screen Y grows downward.
pub const DEFAULT_GRAVITY_Y: f32 = -0.19;

/// Configuration for the engine, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Gravity copied into every entity when it is created (default: -0.19).
    pub gravity_y: f32,
    /// Play-area width in pixels. Hosts measure their container and overwrite this.
    pub width: f32,
    /// Play-area height in pixels.
    pub height: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gravity_y: DEFAULT_GRAVITY_Y,
            width: 500.0,
            height: 500.0,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_gravity(mut self, gravity_y: f32) -> Self {
        self.gravity_y = gravity_y;
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}
