//! Prize-row alignment and the lookahead chain
//!
//! A drifting prize row is phase-shifted so that whatever column the ball
//! actually crosses it in reads as the row's intended slot. The shift for a row
//! is found by a second step chain running ahead of the authoritative one; it
//! is written once and never changes afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::board::Board;
use super::state::{FrameState, RowCrossing, SessionPhase};
use super::tick::step;
use super::timeline::{PrizeTimeline, TARGET_COLUMN};
use crate::consts::MAX_LOOKAHEAD_STEPS;
use crate::wrap_index;

/// Solved alignment for one row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowAlignment {
    /// World x of the peg that starts the slot under the ball at crossing time
    pub goal_peg_x: f32,
    /// Column shift added to the raw arrival column
    pub offset: usize,
}

/// Compute the shift that puts `TARGET_COLUMN` under the ball for this crossing
pub fn solve_alignment(board: &Board, crossing: &RowCrossing) -> RowAlignment {
    RowAlignment {
        goal_peg_x: board.goal_peg_x(crossing.row_index, crossing.ball_x, crossing.ms),
        offset: wrap_index(
            TARGET_COLUMN as i64 - crossing.raw_column as i64,
            board.columns,
        ),
    }
}

/// Write-once map from prize row index to its solved alignment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentTable {
    rows: BTreeMap<usize, RowAlignment>,
}

impl AlignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column offset for a row, if solved
    pub fn get(&self, row_index: usize) -> Option<usize> {
        self.rows.get(&row_index).map(|a| a.offset)
    }

    /// Full alignment for a row, including the goal peg for drawing
    pub fn alignment(&self, row_index: usize) -> Option<RowAlignment> {
        self.rows.get(&row_index).copied()
    }

    /// Store an alignment unless the row already has one; returns the stored offset
    pub fn record(&mut self, row_index: usize, alignment: RowAlignment) -> usize {
        self.rows.entry(row_index).or_insert(alignment).offset
    }

    pub fn contains(&self, row_index: usize) -> bool {
        self.rows.contains_key(&row_index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Solve and record the alignment for a crossing
    pub fn observe(&mut self, board: &Board, crossing: &RowCrossing) -> usize {
        if let Some(offset) = self.get(crossing.row_index) {
            return offset;
        }
        let alignment = solve_alignment(board, crossing);
        log::debug!(
            "Aligned prize row {}: raw column {}, offset {}, goal peg x {:.2}",
            crossing.row_index,
            crossing.raw_column,
            alignment.offset,
            alignment.goal_peg_x
        );
        self.record(crossing.row_index, alignment)
    }
}

/// Step chain that free-runs ahead of the authoritative ball
#[derive(Debug, Clone)]
pub struct Lookahead {
    future: FrameState,
    distance: f32,
}

impl Lookahead {
    pub fn new(start: FrameState, distance: f32) -> Self {
        Self {
            future: start,
            distance,
        }
    }

    pub fn future(&self) -> &FrameState {
        &self.future
    }

    /// Restart the chain from a copy of `start`
    pub fn reset(&mut self, start: FrameState) {
        self.future = start;
    }

    /// Run ahead until the future ball is `distance` below the present one
    ///
    /// Returns the number of steps taken.
    pub fn catch_up(
        &mut self,
        present: &FrameState,
        board: &Board,
        timeline: &PrizeTimeline,
        table: &mut AlignmentTable,
    ) -> u32 {
        let target_y = present.ball.pos.y + self.distance;
        let mut steps = 0;

        while self.future.phase == SessionPhase::Playing
            && (self.future.ball.pos.y < target_y || self.future.frame < present.frame)
            && steps < MAX_LOOKAHEAD_STEPS
        {
            let outcome = step(&self.future, board, timeline, table);
            if let Some(crossing) = &outcome.crossing {
                table.observe(board, crossing);
            }
            self.future = outcome.frame;
            steps += 1;
        }

        if steps > 0 {
            log::trace!(
                "Lookahead advanced {} steps to frame {} (y {:.1})",
                steps,
                self.future.frame,
                self.future.ball.pos.y
            );
        }
        steps
    }
}
