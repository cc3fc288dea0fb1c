//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (timeline generation)
//! - Steps return new state, never mutate their input
//! - No rendering or platform dependencies

pub mod alignment;
pub mod board;
pub mod collision;
pub mod state;
pub mod tick;
pub mod timeline;
pub mod vector;

pub use alignment::{AlignmentTable, Lookahead, RowAlignment, solve_alignment};
pub use board::{Board, Peg};
pub use collision::{ball_peg_overlap, resolve_peg_collision, resolve_wall_collision};
pub use state::{BallState, FrameState, RowCrossing, SessionPhase};
pub use tick::{StepOutcome, detect_crossing, step};
pub use timeline::{PrizeRow, PrizeTimeline, Slot, TARGET_COLUMN, min_timeline_len};
