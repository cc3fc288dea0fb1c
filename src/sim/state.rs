//! Simulation state types
//!
//! Everything here is `Copy`: each step builds a new `FrameState` from the
//! previous one by value, so the authoritative and lookahead chains can never
//! alias each other's state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::board::Board;

/// Phase of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Ball parked above the board, waiting for a start column
    #[default]
    Ready,
    /// Ball falling
    Playing,
    /// Terminal row crossed
    Done,
}

/// Ball kinematics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub pos: Vec2,
    /// Visual rotation (radians)
    pub rot: f32,
    pub rot_vel: f32,
    pub vel: Vec2,
    /// Constant gravity
    pub acc: Vec2,
}

impl BallState {
    /// Ball at rest at `pos` under gravity
    pub fn at_rest(pos: Vec2, gravity: f32) -> Self {
        Self {
            pos,
            rot: 0.0,
            rot_vel: 0.0,
            vel: Vec2::ZERO,
            acc: Vec2::new(0.0, gravity),
        }
    }
}

/// One authoritative (or lookahead) simulation state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameState {
    pub frame: u64,
    /// Elapsed simulation time, always `frame * step_ms`
    pub ms: f64,
    pub ball: BallState,
    pub next_prize_row_index: usize,
    pub prizes_won: u32,
    pub prizes_won_value: f64,
    pub phase: SessionPhase,
}

impl FrameState {
    /// Frame zero with the ball parked at `pos`
    pub fn initial(board: &Board, pos: Vec2) -> Self {
        Self {
            frame: 0,
            ms: 0.0,
            ball: BallState::at_rest(pos, board.gravity),
            next_prize_row_index: 0,
            prizes_won: 0,
            prizes_won_value: 0.0,
            phase: SessionPhase::Ready,
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == SessionPhase::Done
    }
}

/// A ball passing below a prize row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowCrossing {
    pub row_index: usize,
    /// Ball x at the step where the crossing was detected
    pub ball_x: f32,
    /// Simulation time of that step
    pub ms: f64,
    /// Slot column under the ball before alignment
    pub raw_column: usize,
}
