//! Peg field geometry
//!
//! Peg rows sit at `row * row_height` for rows >= 1. Ordinary rows form a
//! checkerboard (odd rows shifted half a column). Every `prize_row_frequency`-th
//! row is a prize row whose pegs drift sideways at constant speed, alternating
//! direction from one prize row to the next.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::PlinkoConfig;
use crate::error::Result;
use crate::{wrap, wrap_index};

/// Resolved board geometry and physics constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub columns: usize,
    pub game_width: f32,
    pub column_width: f32,
    pub row_height: f32,
    pub ball_radius: f32,
    pub peg_radius: f32,
    pub prize_row_frequency: u32,
    /// Prize-row drift speed in units per second
    pub drift_speed: f32,
    pub gravity: f32,
    pub max_speed: f32,
    pub max_rot_vel: f32,
    pub collision_elasticity: f32,
    pub step_ms: f64,
}

/// The one peg considered for collision on a given step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peg {
    pub row: i64,
    pub pos: Vec2,
    /// Zero for ordinary rows, drift velocity for prize rows
    pub vel: Vec2,
}

impl Board {
    pub fn new(config: &PlinkoConfig) -> Result<Self> {
        config.validate()?;
        let column_width = config.column_width();
        Ok(Self {
            columns: config.columns,
            game_width: config.game_width,
            column_width,
            row_height: column_width * config.row_height_ratio,
            ball_radius: column_width * config.ball_radius_ratio,
            peg_radius: column_width * config.peg_radius_ratio,
            prize_row_frequency: config.prize_row_frequency,
            drift_speed: config.prize_row_col_per_sec * column_width,
            gravity: config.gravity,
            max_speed: config.max_speed,
            max_rot_vel: config.max_rot_vel,
            collision_elasticity: config.collision_elasticity,
            step_ms: config.step_ms,
        })
    }

    /// Fixed step in seconds
    #[inline]
    pub fn step_secs(&self) -> f32 {
        (self.step_ms / 1000.0) as f32
    }

    /// Smallest and largest x the ball centre may occupy
    #[inline]
    pub fn x_bounds(&self) -> (f32, f32) {
        (self.ball_radius, self.game_width - self.ball_radius)
    }

    /// Ball contact distance for a peg
    #[inline]
    pub fn contact_distance(&self) -> f32 {
        self.ball_radius + self.peg_radius
    }

    pub fn is_prize_row(&self, row: i64) -> bool {
        row >= 1 && row % self.prize_row_frequency as i64 == 0
    }

    /// Peg row holding prize row `index`
    #[inline]
    pub fn prize_peg_row(&self, index: usize) -> i64 {
        (index as i64 + 1) * self.prize_row_frequency as i64
    }

    /// World y of prize row `index`
    pub fn prize_row_y(&self, index: usize) -> f32 {
        self.prize_peg_row(index) as f32 * self.row_height
    }

    /// Lateral velocity of a peg row (zero for ordinary rows)
    pub fn drift_velocity(&self, row: i64) -> Vec2 {
        if !self.is_prize_row(row) {
            return Vec2::ZERO;
        }
        let direction = if (row / self.prize_row_frequency as i64) % 2 == 0 {
            1.0
        } else {
            -1.0
        };
        Vec2::new(direction * self.drift_speed, 0.0)
    }

    /// Unwrapped lateral displacement of a prize row at time `ms`
    pub fn drift_displacement(&self, index: usize, ms: f64) -> f32 {
        self.drift_velocity(self.prize_peg_row(index)).x * (ms / 1000.0) as f32
    }

    /// Horizontal phase of a row's peg lattice at time `ms`
    fn row_offset(&self, row: i64, ms: f64) -> f32 {
        if self.is_prize_row(row) {
            let displacement = self.drift_velocity(row).x * (ms / 1000.0) as f32;
            wrap(displacement, self.column_width)
        } else if row % 2 != 0 {
            self.column_width / 2.0
        } else {
            0.0
        }
    }

    /// The single peg nearest to `pos`: nearest row, then nearest column in it
    pub fn nearest_peg(&self, pos: Vec2, ms: f64) -> Option<Peg> {
        let row = (pos.y / self.row_height).round() as i64;
        if row < 1 {
            return None;
        }
        let offset = self.row_offset(row, ms);
        let col = ((pos.x - offset) / self.column_width).round();
        Some(Peg {
            row,
            pos: Vec2::new(col * self.column_width + offset, row as f32 * self.row_height),
            vel: self.drift_velocity(row),
        })
    }

    /// Column index (before alignment) of the prize-row slot under `x`
    pub fn arrival_column(&self, index: usize, x: f32, ms: f64) -> usize {
        let displacement = self.drift_displacement(index, ms);
        let raw = ((x - displacement) / self.column_width).floor() as i64;
        wrap_index(raw, self.columns)
    }

    /// World x of the peg on the left edge of the slot under `x`
    pub fn goal_peg_x(&self, index: usize, x: f32, ms: f64) -> f32 {
        let displacement = self.drift_displacement(index, ms);
        displacement + ((x - displacement) / self.column_width).floor() * self.column_width
    }

    /// Resting position above the board for a start column
    pub fn launch_position(&self, column: usize, jitter: f32) -> Vec2 {
        let (min_x, max_x) = self.x_bounds();
        let x = self.column_width * (column as f32 + 0.5) + jitter;
        Vec2::new(x.clamp(min_x, max_x), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(&PlinkoConfig::default()).unwrap()
    }

    #[test]
    fn test_derived_geometry() {
        let b = board();
        assert_eq!(b.column_width, 20.0);
        assert_eq!(b.row_height, 20.0);
        assert!((b.ball_radius - 3.0).abs() < 1e-5);
        assert!((b.peg_radius - 2.0).abs() < 1e-5);
        assert_eq!(b.drift_speed, 10.0);
    }

    #[test]
    fn test_invalid_columns_rejected() {
        assert!(Board::new(&PlinkoConfig::with_columns(1)).is_err());
    }

    #[test]
    fn test_prize_rows() {
        let b = board();
        assert!(!b.is_prize_row(0));
        assert!(!b.is_prize_row(3));
        assert!(b.is_prize_row(4));
        assert!(b.is_prize_row(8));
        assert_eq!(b.prize_peg_row(0), 4);
        assert_eq!(b.prize_row_y(1), 160.0);
    }

    #[test]
    fn test_drift_alternates() {
        let b = board();
        assert_eq!(b.drift_velocity(3), Vec2::ZERO);
        let first = b.drift_velocity(b.prize_peg_row(0));
        let second = b.drift_velocity(b.prize_peg_row(1));
        assert_eq!(first.x, -second.x);
        assert_eq!(first.x.abs(), b.drift_speed);
    }

    #[test]
    fn test_checkerboard_pegs() {
        let b = board();
        // No pegs above row 1
        assert!(b.nearest_peg(Vec2::new(50.0, 5.0), 0.0).is_none());

        // Odd row: half-column offset
        let peg = b.nearest_peg(Vec2::new(52.0, 21.0), 0.0).unwrap();
        assert_eq!(peg.row, 1);
        assert_eq!(peg.pos, Vec2::new(50.0, 20.0));
        assert_eq!(peg.vel, Vec2::ZERO);

        // Even row: aligned to column edges
        let peg = b.nearest_peg(Vec2::new(52.0, 41.0), 0.0).unwrap();
        assert_eq!(peg.pos, Vec2::new(60.0, 40.0));
    }

    #[test]
    fn test_prize_row_pegs_drift() {
        let b = board();
        let y = b.prize_row_y(0);
        let at_rest = b.nearest_peg(Vec2::new(41.0, y), 0.0).unwrap();
        assert_eq!(at_rest.pos.x, 40.0);

        // One second later the lattice has moved by drift_speed (mod column width)
        let moved = b.nearest_peg(Vec2::new(41.0, y), 1000.0).unwrap();
        let expected = wrap(b.drift_velocity(at_rest.row).x, b.column_width);
        assert!((wrap(moved.pos.x, b.column_width) - expected).abs() < 1e-4);
        assert_eq!(moved.vel, b.drift_velocity(at_rest.row));
    }

    #[test]
    fn test_arrival_column_follows_drift() {
        let b = board();
        assert_eq!(b.arrival_column(0, 45.0, 0.0), 2);
        // After drifting exactly one column the same x reads the neighbouring slot
        let one_column_ms = 1000.0 * (b.column_width / b.drift_speed) as f64;
        let shifted = b.arrival_column(0, 45.0, one_column_ms);
        let direction = b.drift_velocity(b.prize_peg_row(0)).x.signum();
        let expected = wrap_index(2 - direction as i64, b.columns);
        assert_eq!(shifted, expected);
    }

    #[test]
    fn test_ball_passes_between_wall_and_offset_peg() {
        let b = board();
        let (min_x, max_x) = b.x_bounds();
        // Outermost pegs of an odd row
        let left = b.nearest_peg(Vec2::new(min_x, b.row_height), 0.0).unwrap();
        let right = b.nearest_peg(Vec2::new(max_x, b.row_height), 0.0).unwrap();
        assert_eq!(left.pos.x, b.column_width / 2.0);
        assert_eq!(right.pos.x, b.game_width - b.column_width / 2.0);
        // A ball pinned to either wall clears the peg beside it
        assert!(left.pos.x - min_x >= b.contact_distance());
        assert!(max_x - right.pos.x >= b.contact_distance());
    }

    #[test]
    fn test_goal_peg_x_is_slot_edge() {
        let b = board();
        let goal = b.goal_peg_x(0, 45.0, 0.0);
        assert_eq!(goal, 40.0);
    }
}
