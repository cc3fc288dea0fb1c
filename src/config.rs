//! Board and physics tuning
//!
//! Loaded from JSON; any field left out falls back to the defaults in `consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{PlinkoError, Result};

/// Data-driven tuning for one play session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlinkoConfig {
    // === Board ===
    /// Number of start columns (and slots per prize row)
    pub columns: usize,
    /// Board width in world units
    pub game_width: f32,
    /// Ball radius as a fraction of column width
    pub ball_radius_ratio: f32,
    /// Peg radius as a fraction of column width
    pub peg_radius_ratio: f32,
    /// Row spacing as a fraction of column width
    pub row_height_ratio: f32,

    // === Prize rows ===
    /// Every Nth peg row is a prize row
    pub prize_row_frequency: u32,
    /// Lateral drift of prize-row pegs, in columns per second
    pub prize_row_col_per_sec: f32,

    // === Physics ===
    pub gravity: f32,
    pub max_speed: f32,
    pub max_rot_vel: f32,
    /// Restitution applied to the normal velocity component on impact
    pub collision_elasticity: f32,
    /// Fixed step in milliseconds
    pub step_ms: f64,

    // === Presentation / lookahead ===
    pub viewport_height: f32,
    /// How many viewports the lookahead chain runs ahead of the ball
    pub lookahead_viewports: f32,
    /// Maximum launch offset from the column centre, as a fraction of column width
    pub launch_jitter_ratio: f32,
}

impl Default for PlinkoConfig {
    fn default() -> Self {
        Self {
            columns: COLUMNS,
            game_width: GAME_WIDTH,
            ball_radius_ratio: BALL_RADIUS_RATIO,
            peg_radius_ratio: PEG_RADIUS_RATIO,
            row_height_ratio: ROW_HEIGHT_RATIO,

            prize_row_frequency: PRIZE_ROW_FREQUENCY,
            prize_row_col_per_sec: PRIZE_ROW_COL_PER_SEC,

            gravity: GRAVITY,
            max_speed: MAX_SPEED,
            max_rot_vel: MAX_ROT_VEL,
            collision_elasticity: COLLISION_ELASTICITY,
            step_ms: STEP_MS,

            viewport_height: VIEWPORT_HEIGHT,
            lookahead_viewports: LOOKAHEAD_VIEWPORTS,
            launch_jitter_ratio: LAUNCH_JITTER_RATIO,
        }
    }
}

impl PlinkoConfig {
    /// Default tuning with a different column count
    pub fn with_columns(columns: usize) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default config");
                Ok(Self::default())
            }
        }
    }

    /// Reject tuning that would make the board geometry or clock meaningless
    pub fn validate(&self) -> Result<()> {
        if self.columns < 2 {
            return Err(PlinkoError::InvalidColumnCount {
                columns: self.columns,
            });
        }
        if !(self.game_width > 0.0) {
            return Err(PlinkoError::InvalidConfig("game_width must be positive"));
        }
        if !(self.ball_radius_ratio > 0.0) || !(self.peg_radius_ratio >= 0.0) {
            return Err(PlinkoError::InvalidConfig("radii must be positive"));
        }
        // Odd rows put a peg half a column from each wall
        if self.ball_radius_ratio * 2.0 + self.peg_radius_ratio >= 0.5 {
            return Err(PlinkoError::InvalidConfig(
                "ball does not fit between a wall and the nearest offset peg",
            ));
        }
        if !(self.row_height_ratio > 0.0) {
            return Err(PlinkoError::InvalidConfig("row_height_ratio must be positive"));
        }
        if self.prize_row_frequency == 0 {
            return Err(PlinkoError::InvalidConfig("prize_row_frequency must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.collision_elasticity) {
            return Err(PlinkoError::InvalidConfig("collision_elasticity must be in [0, 1)"));
        }
        if !(self.step_ms > 0.0) {
            return Err(PlinkoError::InvalidConfig("step_ms must be positive"));
        }
        if !(self.max_speed > 0.0) || !(self.max_rot_vel > 0.0) {
            return Err(PlinkoError::InvalidConfig("speed caps must be positive"));
        }
        if !(self.launch_jitter_ratio >= 0.0) || self.launch_jitter_ratio >= 0.5 {
            return Err(PlinkoError::InvalidConfig("launch_jitter_ratio must be in [0, 0.5)"));
        }
        Ok(())
    }

    /// Width of one column in world units
    pub fn column_width(&self) -> f32 {
        self.game_width / self.columns as f32
    }

    /// How far ahead (world y) the lookahead chain runs
    pub fn lookahead_distance(&self) -> f32 {
        self.viewport_height * self.lookahead_viewports
    }
}
