//! Play session driver
//!
//! Owns the authoritative frame, the lookahead chain and the alignment table,
//! and turns wall-clock time into fixed steps plus an interpolated ball pose
//! for drawing.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::PlinkoConfig;
use crate::consts::MAX_SUBSTEPS;
use crate::error::{PlinkoError, Result};
use crate::prize::PrizeHistory;
use crate::sim::{
    AlignmentTable, Board, FrameState, Lookahead, PrizeRow, PrizeTimeline, RowAlignment, SessionPhase,
    step,
};

/// Ball pose and totals for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedBallState {
    pub pos: Vec2,
    pub rot: f32,
    pub prizes_won: u32,
    pub prizes_won_value: f64,
    pub phase: SessionPhase,
}

/// Score display state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub prizes_won: u32,
    pub prizes_won_value: f64,
}

/// One play session
#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    timeline: PrizeTimeline,
    alignment: AlignmentTable,
    /// Last two authoritative frames, for interpolation
    previous: FrameState,
    current: FrameState,
    lookahead: Lookahead,
    accumulator_ms: f64,
    last_wall_ms: Option<f64>,
    /// Maximum launch offset from the column centre (world units)
    launch_jitter: f32,
    rng: Pcg32,
}

impl Session {
    /// Build the board and prize timeline; the ball waits above the board
    pub fn start(config: &PlinkoConfig, history: &PrizeHistory, seed: u64) -> Result<Self> {
        let board = Board::new(config)?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let timeline = PrizeTimeline::generate(history, board.columns, &mut rng)?;

        let parked = FrameState::initial(&board, board.launch_position(board.columns / 2, 0.0));
        log::info!(
            "Session started (seed {}): {} columns, {} prize rows, terminal row {}",
            seed,
            board.columns,
            timeline.len(),
            timeline.terminal_row_index()
        );

        Ok(Self {
            launch_jitter: config.launch_jitter_ratio * board.column_width,
            lookahead: Lookahead::new(parked, config.lookahead_distance()),
            board,
            timeline,
            alignment: AlignmentTable::new(),
            previous: parked,
            current: parked,
            accumulator_ms: 0.0,
            last_wall_ms: None,
            rng,
        })
    }

    /// Drop the ball from a start column
    pub fn launch(&mut self, column: usize) -> Result<()> {
        if self.current.phase != SessionPhase::Ready {
            return Err(PlinkoError::AlreadyLaunched);
        }
        if column >= self.board.columns {
            return Err(PlinkoError::InvalidStartColumn {
                column,
                columns: self.board.columns,
            });
        }

        // Never exactly centred, or the ball could balance on the first peg
        let jitter = if self.launch_jitter > 0.0 {
            let magnitude = self.rng.random_range(0.5..=1.0) * self.launch_jitter;
            if self.rng.random::<bool>() { magnitude } else { -magnitude }
        } else {
            0.0
        };

        let mut frame = FrameState::initial(&self.board, self.board.launch_position(column, jitter));
        frame.phase = SessionPhase::Playing;
        self.previous = frame;
        self.current = frame;
        self.accumulator_ms = 0.0;
        self.lookahead.reset(frame);
        self.lookahead
            .catch_up(&self.current, &self.board, &self.timeline, &mut self.alignment);

        log::info!("Ball launched from column {} (x {:.2})", column, frame.ball.pos.x);
        Ok(())
    }

    /// Run the fixed-step loop up to `wall_clock_ms` and return the pose to draw
    ///
    /// Elapsed time per call is clamped to one step, so a stall never turns
    /// into a burst of catch-up steps.
    pub fn advance(&mut self, wall_clock_ms: f64) -> InterpolatedBallState {
        let step_ms = self.board.step_ms;
        let elapsed = self
            .last_wall_ms
            .map_or(0.0, |last| (wall_clock_ms - last).clamp(0.0, step_ms));
        self.last_wall_ms = Some(wall_clock_ms);

        if self.current.phase != SessionPhase::Playing {
            return self.interpolated();
        }

        self.accumulator_ms += elapsed;
        let mut substeps = 0;
        while self.accumulator_ms >= step_ms && substeps < MAX_SUBSTEPS {
            let outcome = step(&self.current, &self.board, &self.timeline, &self.alignment);
            if let Some(crossing) = &outcome.crossing {
                log::debug!(
                    "Crossed prize row {} at x {:.2} (won {}, value {:.2})",
                    crossing.row_index,
                    crossing.ball_x,
                    outcome.frame.prizes_won,
                    outcome.frame.prizes_won_value
                );
            }
            self.previous = self.current;
            self.current = outcome.frame;
            self.accumulator_ms -= step_ms;
            substeps += 1;

            if self.current.is_done() {
                self.accumulator_ms = 0.0;
                log::info!(
                    "Session finished at frame {}: {} prizes worth {:.2}",
                    self.current.frame,
                    self.current.prizes_won,
                    self.current.prizes_won_value
                );
                break;
            }
        }

        self.lookahead
            .catch_up(&self.current, &self.board, &self.timeline, &mut self.alignment);
        self.interpolated()
    }

    /// Pose between the last two authoritative frames
    pub fn interpolated(&self) -> InterpolatedBallState {
        let alpha = if self.current.phase == SessionPhase::Playing {
            (self.accumulator_ms / self.board.step_ms).clamp(0.0, 1.0) as f32
        } else {
            1.0
        };
        let prev = &self.previous.ball;
        let cur = &self.current.ball;
        InterpolatedBallState {
            pos: prev.pos.lerp(cur.pos, alpha),
            rot: prev.rot + (cur.rot - prev.rot) * alpha,
            prizes_won: self.current.prizes_won,
            prizes_won_value: self.current.prizes_won_value,
            phase: self.current.phase,
        }
    }

    /// Physical slot layout of a prize row, once its alignment is known
    pub fn upcoming_row_layout(&self, row_index: usize) -> Option<PrizeRow> {
        let offset = self.alignment.get(row_index)?;
        self.timeline.row(row_index).map(|row| row.rotated(offset))
    }

    /// Solved alignment of a prize row, with the goal peg the ball will pass
    pub fn row_alignment(&self, row_index: usize) -> Option<RowAlignment> {
        self.alignment.alignment(row_index)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.current.phase,
            prizes_won: self.current.prizes_won,
            prizes_won_value: self.current.prizes_won_value,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn timeline(&self) -> &PrizeTimeline {
        &self.timeline
    }

    pub fn alignment(&self) -> &AlignmentTable {
        &self.alignment
    }

    pub fn current_frame(&self) -> &FrameState {
        &self.current
    }

    pub fn lookahead_frame(&self) -> &FrameState {
        self.lookahead.future()
    }
}
