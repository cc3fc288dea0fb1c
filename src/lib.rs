//! Plinko Sim - gravity-driven ball through a peg field with a pre-decided prize timeline
//!
//! Core modules:
//! - `sim`: Deterministic simulation (integrator, collisions, timeline, alignment)
//! - `session`: Fixed-step clock driver and presentation-facing interface
//! - `config`: Data-driven board and physics tuning
//! - `prize`: Prize catalog and player history injected at session start

pub mod config;
pub mod error;
pub mod prize;
pub mod session;
pub mod sim;

pub use config::PlinkoConfig;
pub use error::{PlinkoError, Result};
pub use prize::{PrizeDefinition, PrizeHistory};
pub use session::{InterpolatedBallState, Session, SessionSnapshot};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (40 Hz)
    pub const STEP_MS: f64 = 25.0;
    /// Maximum substeps per advance call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Maximum lookahead steps per advance call
    pub const MAX_LOOKAHEAD_STEPS: u32 = 2048;

    /// Board dimensions (world units, y grows downward)
    pub const GAME_WIDTH: f32 = 100.0;
    pub const COLUMNS: usize = 5;
    /// Radii as a fraction of column width; the ball must fit between a side
    /// wall and the half-offset peg next to it
    pub const BALL_RADIUS_RATIO: f32 = 0.15;
    pub const PEG_RADIUS_RATIO: f32 = 0.1;
    /// Row spacing as a fraction of column width
    pub const ROW_HEIGHT_RATIO: f32 = 1.0;
    /// Visible height of the board, used to size the lookahead distance
    pub const VIEWPORT_HEIGHT: f32 = 150.0;
    pub const LOOKAHEAD_VIEWPORTS: f32 = 1.5;

    /// Every Nth peg row is a drifting prize row
    pub const PRIZE_ROW_FREQUENCY: u32 = 4;
    /// Prize row drift speed in columns per second
    pub const PRIZE_ROW_COL_PER_SEC: f32 = 0.5;

    /// Ball physics (units/s², units/s, rad/s)
    pub const GRAVITY: f32 = 300.0;
    pub const MAX_SPEED: f32 = 160.0;
    pub const MAX_ROT_VEL: f32 = 10.0;
    /// Fraction of the normal velocity kept after a bounce
    pub const COLLISION_ELASTICITY: f32 = 0.3;
    /// Spin added when the ball hits a side wall (sign encodes side)
    pub const WALL_SPIN_KICK: f32 = 2.0;
    /// Launch jitter as a fraction of column width
    pub const LAUNCH_JITTER_RATIO: f32 = 0.1;
    /// Not-yet-won units of one prize considered for near-miss sampling
    pub const MAX_NEAR_MISS_UNITS: u32 = 1024;
}

/// Positive remainder, for wrapping lateral drift into one column
#[inline]
pub fn wrap(value: f32, period: f32) -> f32 {
    value.rem_euclid(period)
}

/// Positive modulo for signed column indices
#[inline]
pub fn wrap_index(index: i64, len: usize) -> usize {
    index.rem_euclid(len as i64) as usize
}
