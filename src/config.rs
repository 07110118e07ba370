use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Hard ceiling on platforms in any emitted scene.
pub const MAX_SCENE_PLATFORMS: usize = 12;
/// Every emitted scene carries at least this many pickups.
pub const MIN_SCENE_PICKUPS: usize = 2;

/// Downstream physics constants, in world units (pixels, usually).
/// When present, traversal limits are derived from these instead of the fixed values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsCalibration {
    pub gravity: f32,
    pub jump_velocity: f32,
    pub move_speed: f32,
    pub world_width: f32,
    pub world_height: f32,
}

impl Default for PhysicsCalibration {
    fn default() -> Self {
        Self {
            gravity: 980.0,
            jump_velocity: 400.0,
            move_speed: 200.0,
            world_width: 960.0,
            world_height: 540.0,
        }
    }
}

impl PhysicsCalibration {
    /// Apex of a full jump, normalized to world height. h = v^2 / (2g)
    pub fn jump_height(&self) -> f32 {
        let apex = (self.jump_velocity * self.jump_velocity) / (2.0 * self.gravity);
        apex / self.world_height
    }

    /// Horizontal distance covered during a full jump, normalized to world width.
    pub fn horizontal_reach(&self) -> f32 {
        let air_time = 2.0 * self.jump_velocity / self.gravity;
        air_time * self.move_speed / self.world_width
    }
}

/// Every threshold and cap the synthesis pipeline uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub max_jump_height: f32,
    pub max_horizontal_reach: f32,
    pub max_repair_iterations: usize,
    /// Cap applied after deduplication, before repair.
    pub max_candidates: usize,
    /// Absolute cap applied after repair.
    pub max_platforms: usize,
    pub min_platform_width: f32,
    pub platform_thickness: f32,
    pub duplicate_band: f32,
    pub bridge_width: f32,
    pub ground_y: f32,
    pub spawn_clearance: f32,
    pub player_spawn_x: f32,
    pub max_obstacles: usize,
    pub max_collectibles: usize,
    pub max_platform_pickups: usize,
    pub max_topped_up_pickups: usize,
    pub min_pickups: usize,
    pub max_enemies: usize,
    pub enemy_min_width: f32,
    pub physics: Option<PhysicsCalibration>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_jump_height: 0.25,
            max_horizontal_reach: 0.40,
            max_repair_iterations: 10,
            max_candidates: 10,
            max_platforms: 12,
            min_platform_width: 0.08,
            platform_thickness: 0.03,
            duplicate_band: 0.05,
            bridge_width: 0.15,
            ground_y: 0.92,
            spawn_clearance: 0.06,
            player_spawn_x: 0.08,
            max_obstacles: 4,
            max_collectibles: 5,
            max_platform_pickups: 5,
            max_topped_up_pickups: 4,
            min_pickups: 3,
            max_enemies: 2,
            enemy_min_width: 0.15,
            physics: None,
        }
    }
}

/// Resolved jump envelope used by the repair engine and the validator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TraversalLimits {
    pub max_vertical: f32,
    pub max_horizontal: f32,
}

impl SynthConfig {
    pub fn traversal(&self) -> TraversalLimits {
        match &self.physics {
            Some(p) => TraversalLimits {
                max_vertical: p.jump_height(),
                max_horizontal: p.horizontal_reach(),
            },
            None => TraversalLimits {
                max_vertical: self.max_jump_height,
                max_horizontal: self.max_horizontal_reach,
            },
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&contents).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: display,
                source,
            },
            other => other,
        })
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let cfg: SynthConfig =
            serde_json::from_str(contents).map_err(|source| ConfigError::Parse {
                path: "<inline>".to_string(),
                source,
            })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_jump_height", self.max_jump_height),
            ("max_horizontal_reach", self.max_horizontal_reach),
            ("min_platform_width", self.min_platform_width),
            ("platform_thickness", self.platform_thickness),
            ("duplicate_band", self.duplicate_band),
            ("bridge_width", self.bridge_width),
            ("ground_y", self.ground_y),
            ("spawn_clearance", self.spawn_clearance),
            ("enemy_min_width", self.enemy_min_width),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        if !self.player_spawn_x.is_finite() || !(0.0..=1.0).contains(&self.player_spawn_x) {
            return Err(ConfigError::Invalid(format!(
                "player_spawn_x must lie in [0, 1], got {}",
                self.player_spawn_x
            )));
        }
        if self.ground_y > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "ground_y must not exceed 1, got {}",
                self.ground_y
            )));
        }
        if self.bridge_width >= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "bridge_width must be below 1, got {}",
                self.bridge_width
            )));
        }
        if !(1..=MAX_SCENE_PLATFORMS).contains(&self.max_platforms) {
            return Err(ConfigError::Invalid(format!(
                "max_platforms must lie in 1..={}, got {}",
                MAX_SCENE_PLATFORMS, self.max_platforms
            )));
        }
        if self.max_candidates == 0 {
            return Err(ConfigError::Invalid(
                "max_candidates must be at least 1".to_string(),
            ));
        }
        if self.max_candidates > self.max_platforms {
            return Err(ConfigError::Invalid(format!(
                "max_candidates ({}) exceeds max_platforms ({})",
                self.max_candidates, self.max_platforms
            )));
        }
        if self.min_pickups < MIN_SCENE_PICKUPS {
            return Err(ConfigError::Invalid(format!(
                "min_pickups must be at least {}, got {}",
                MIN_SCENE_PICKUPS, self.min_pickups
            )));
        }
        if self.max_topped_up_pickups < self.min_pickups {
            return Err(ConfigError::Invalid(format!(
                "max_topped_up_pickups ({}) is below min_pickups ({})",
                self.max_topped_up_pickups, self.min_pickups
            )));
        }
        if let Some(p) = &self.physics {
            let fields = [
                ("physics.gravity", p.gravity),
                ("physics.jump_velocity", p.jump_velocity),
                ("physics.move_speed", p.move_speed),
                ("physics.world_width", p.world_width),
                ("physics.world_height", p.world_height),
            ];
            for (name, value) in fields {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "{name} must be a positive finite number, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }
}
