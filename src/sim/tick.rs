//! Fixed timestep simulation step
//!
//! `step` is pure: it reads the previous frame and returns a new one. The
//! authoritative chain and the lookahead chain both run through it.

use super::alignment::{AlignmentTable, solve_alignment};
use super::board::Board;
use super::collision::{resolve_peg_collision, resolve_wall_collision};
use super::state::{FrameState, RowCrossing, SessionPhase};
use super::timeline::{PrizeTimeline, Slot};
use super::vector::clamp_length;

/// Result of one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub frame: FrameState,
    /// Prize row the ball passed during this step, if any
    pub crossing: Option<RowCrossing>,
}

/// Advance a frame by one fixed step
///
/// Frames that are not `Playing` come back unchanged.
pub fn step(
    prev: &FrameState,
    board: &Board,
    timeline: &PrizeTimeline,
    alignment: &AlignmentTable,
) -> StepOutcome {
    if prev.phase != SessionPhase::Playing {
        return StepOutcome {
            frame: *prev,
            crossing: None,
        };
    }

    let dt = board.step_secs();
    let frame = prev.frame + 1;
    let ms = frame as f64 * board.step_ms;

    // Semi-implicit Euler with a speed cap
    let mut ball = prev.ball;
    ball.vel = clamp_length(ball.vel + ball.acc * dt, board.max_speed);
    ball.pos += ball.vel * dt;
    ball.rot += ball.rot_vel * dt;

    if let Some(peg) = board.nearest_peg(ball.pos, ms) {
        ball = resolve_peg_collision(ball, &peg, board);
    }
    ball = resolve_wall_collision(ball, board);

    // A drifting peg can add speed
    ball.vel = clamp_length(ball.vel, board.max_speed);
    ball.rot_vel = ball.rot_vel.clamp(-board.max_rot_vel, board.max_rot_vel);

    let mut next = FrameState {
        frame,
        ms,
        ball,
        ..*prev
    };

    let crossing = detect_crossing(&next, board, timeline);
    if let Some(crossing) = &crossing {
        apply_crossing(&mut next, crossing, board, timeline, alignment);
    }

    StepOutcome { frame: next, crossing }
}

/// The next prize row, if the ball has just dropped below it
pub fn detect_crossing(frame: &FrameState, board: &Board, timeline: &PrizeTimeline) -> Option<RowCrossing> {
    let index = frame.next_prize_row_index;
    if index >= timeline.len() || frame.ball.pos.y <= board.prize_row_y(index) {
        return None;
    }
    let x = frame.ball.pos.x;
    Some(RowCrossing {
        row_index: index,
        ball_x: x,
        ms: frame.ms,
        raw_column: board.arrival_column(index, x, frame.ms),
    })
}

/// Score the slot the ball landed in and move on to the next row
///
/// Without a stored offset the row is solved on the spot; the solver is
/// deterministic, so this matches what the lookahead chain records.
fn apply_crossing(
    frame: &mut FrameState,
    crossing: &RowCrossing,
    board: &Board,
    timeline: &PrizeTimeline,
    alignment: &AlignmentTable,
) {
    let offset = alignment
        .get(crossing.row_index)
        .unwrap_or_else(|| solve_alignment(board, crossing).offset);

    if let Some(Slot::Prize(prize)) = timeline.landed_slot(crossing.row_index, crossing.raw_column, offset) {
        frame.prizes_won += 1;
        frame.prizes_won_value += timeline.prize_size(prize);
    }

    if crossing.row_index == timeline.terminal_row_index() {
        frame.phase = SessionPhase::Done;
    }
    frame.next_prize_row_index += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlinkoConfig;
    use crate::sim::alignment::RowAlignment;
    use crate::sim::timeline::PrizeRow;
    use glam::Vec2;
    use proptest::prelude::*;

    fn board() -> Board {
        Board::new(&PlinkoConfig::default()).unwrap()
    }

    fn timeline() -> PrizeTimeline {
        PrizeTimeline::from_rows(
            vec![PrizeRow::won(5, 0), PrizeRow::terminal(5, 3), PrizeRow::plain(5)],
            1,
            vec![25.0],
        )
        .unwrap()
    }

    fn playing(board: &Board, pos: Vec2, vel: Vec2) -> FrameState {
        let mut frame = FrameState::initial(board, pos);
        frame.ball.vel = vel;
        frame.phase = SessionPhase::Playing;
        frame
    }

    #[test]
    fn test_ready_frame_does_not_move() {
        let b = board();
        let frame = FrameState::initial(&b, Vec2::new(50.0, 0.0));
        let outcome = step(&frame, &b, &timeline(), &AlignmentTable::new());
        assert_eq!(outcome.frame, frame);
        assert!(outcome.crossing.is_none());
    }

    #[test]
    fn test_free_fall_step() {
        let b = board();
        let frame = playing(&b, Vec2::new(50.0, 0.0), Vec2::ZERO);
        let next = step(&frame, &b, &timeline(), &AlignmentTable::new()).frame;

        let dt = b.step_secs();
        assert_eq!(next.frame, 1);
        assert_eq!(next.ms, b.step_ms);
        assert!((next.ball.vel.y - b.gravity * dt).abs() < 1e-4);
        assert!((next.ball.pos.y - b.gravity * dt * dt).abs() < 1e-4);
        // Input untouched
        assert_eq!(frame.frame, 0);
        assert_eq!(frame.ball.vel, Vec2::ZERO);
    }

    #[test]
    fn test_clock_is_exact_multiple_of_step() {
        let b = board();
        let tl = timeline();
        let table = AlignmentTable::new();
        let mut frame = playing(&b, Vec2::new(37.0, 0.0), Vec2::ZERO);
        for _ in 0..60 {
            frame = step(&frame, &b, &tl, &table).frame;
        }
        assert_eq!(frame.frame, 60);
        assert_eq!(frame.ms, 60.0 * b.step_ms);
    }

    #[test]
    fn test_speed_cap() {
        let b = board();
        let frame = playing(&b, Vec2::new(50.0, 10.0), Vec2::new(0.0, 5000.0));
        let next = step(&frame, &b, &timeline(), &AlignmentTable::new()).frame;
        assert!(next.ball.vel.length() <= b.max_speed + 1e-3);
    }

    #[test]
    fn test_crossing_won_row_scores_prize() {
        let b = board();
        let y = b.prize_row_y(0);
        let frame = playing(&b, Vec2::new(45.0, y - 0.5), Vec2::new(0.0, 100.0));
        let outcome = step(&frame, &b, &timeline(), &AlignmentTable::new());

        let crossing = outcome.crossing.unwrap();
        assert_eq!(crossing.row_index, 0);
        assert_eq!(outcome.frame.next_prize_row_index, 1);
        assert_eq!(outcome.frame.prizes_won, 1);
        assert_eq!(outcome.frame.prizes_won_value, 25.0);
        assert_eq!(outcome.frame.phase, SessionPhase::Playing);
    }

    #[test]
    fn test_crossing_uses_stored_offset() {
        let b = board();
        let tl = timeline();
        let y = b.prize_row_y(0);
        let frame = playing(&b, Vec2::new(45.0, y - 0.5), Vec2::new(0.0, 100.0));
        let raw = step(&frame, &b, &tl, &AlignmentTable::new())
            .crossing
            .unwrap()
            .raw_column;

        // Shift the row so the ball lands on the midpoint gap instead
        let mut table = AlignmentTable::new();
        let midpoint = PrizeRow::midpoint(5);
        table.record(
            0,
            RowAlignment {
                goal_peg_x: 0.0,
                offset: (midpoint + 5 - raw) % 5,
            },
        );
        let outcome = step(&frame, &b, &tl, &table);
        assert_eq!(outcome.frame.prizes_won, 0);
        assert_eq!(outcome.frame.next_prize_row_index, 1);
    }

    #[test]
    fn test_terminal_row_ends_session() {
        let b = board();
        let y = b.prize_row_y(1);
        let mut frame = playing(&b, Vec2::new(30.0, y - 0.5), Vec2::new(0.0, 100.0));
        frame.next_prize_row_index = 1;
        let outcome = step(&frame, &b, &timeline(), &AlignmentTable::new());
        assert_eq!(outcome.frame.phase, SessionPhase::Done);
        assert_eq!(outcome.frame.prizes_won, 0);

        // Done frames are inert
        let after = step(&outcome.frame, &b, &timeline(), &AlignmentTable::new());
        assert_eq!(after.frame, outcome.frame);
    }

    #[test]
    fn test_ball_against_wall_falls_past_offset_peg() {
        let b = board();
        let tl = timeline();
        let table = AlignmentTable::new();
        // Dropped beside each wall, just inside the row-1 peg half a column in
        for x in [7.0, b.game_width - 7.0] {
            let mut frame = playing(&b, Vec2::new(x, 0.0), Vec2::ZERO);
            let mut steps = 0;
            while frame.ball.pos.y < 3.0 * b.row_height && steps < 2_000 {
                frame = step(&frame, &b, &tl, &table).frame;
                steps += 1;
            }
            assert!(
                frame.ball.pos.y >= 3.0 * b.row_height,
                "ball from x {} stuck at {:?}",
                x,
                frame.ball.pos
            );
        }
    }

    #[test]
    fn test_trajectory_is_deterministic() {
        let b = board();
        let tl = timeline();
        let table = AlignmentTable::new();
        let start = playing(&b, Vec2::new(41.3, 0.0), Vec2::ZERO);
        let run = || {
            let mut frame = start;
            let mut path = Vec::new();
            for _ in 0..400 {
                frame = step(&frame, &b, &tl, &table).frame;
                path.push(frame);
            }
            path
        };
        assert_eq!(run(), run());
    }

    proptest! {
        #[test]
        fn prop_step_respects_bounds(
            x in 0.0f32..100.0,
            y in 0.0f32..400.0,
            vx in -400.0f32..400.0,
            vy in -400.0f32..400.0,
            rot_vel in -50.0f32..50.0,
            frame_no in 0u64..10_000,
        ) {
            let b = board();
            let mut frame = playing(&b, Vec2::new(x, y), Vec2::new(vx, vy));
            frame.ball.rot_vel = rot_vel;
            frame.frame = frame_no;
            frame.ms = frame_no as f64 * b.step_ms;

            let next = step(&frame, &b, &timeline(), &AlignmentTable::new()).frame;
            let (min_x, max_x) = b.x_bounds();
            prop_assert!(next.ball.vel.length() <= b.max_speed + 1e-3);
            prop_assert!(next.ball.rot_vel.abs() <= b.max_rot_vel);
            prop_assert!(next.ball.pos.x >= min_x && next.ball.pos.x <= max_x);
            prop_assert_eq!(next.frame, frame_no + 1);
        }
    }
}
