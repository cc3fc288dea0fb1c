//! Collision detection and response for walls and pegs
//!
//! Only one peg is tested per step (nearest row, nearest column). The speed cap
//! bounds how far the ball can travel in one step, which keeps penetration
//! shallow enough for this to hold up at the fixed step size.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use super::board::{Board, Peg};
use super::state::BallState;
use super::vector::{angle_between, normalize, project};
use crate::consts::WALL_SPIN_KICK;

/// Weight of tangential slip converted into spin on a peg hit
const SLIP_SPIN_FACTOR: f32 = 0.25;
/// Fraction of spin kept through a peg hit
const PEG_SPIN_DAMPING: f32 = 0.5;

/// Whether the ball overlaps `peg`
#[inline]
pub fn ball_peg_overlap(ball_pos: Vec2, peg: &Peg, board: &Board) -> bool {
    ball_pos.distance(peg.pos) < board.contact_distance()
}

/// Bounce the ball off a peg it overlaps
///
/// Only the approach component (along ball→peg) is reflected and damped, so
/// tangential motion survives. A drifting peg can push the ball along but never
/// drags it. The ball is then placed exactly at contact distance.
pub fn resolve_peg_collision(ball: BallState, peg: &Peg, board: &Board) -> BallState {
    if !ball_peg_overlap(ball.pos, peg, board) {
        return ball;
    }

    let diff = peg.pos - ball.pos;
    let perpendicular = project(ball.vel, diff);
    let parallel = ball.vel - perpendicular;

    let mut vel = ball.vel;
    if angle_between(diff, ball.vel) < FRAC_PI_2 {
        vel = parallel + perpendicular * -board.collision_elasticity;
    }

    if peg.vel != Vec2::ZERO {
        let push_angle = angle_between(peg.vel, -diff);
        if push_angle < FRAC_PI_2 {
            vel += peg.vel * push_angle.cos();
        }
    }

    let slip_y = if parallel.y > 0.0 { -1.0 } else { 1.0 };
    let slip_x = if vel.x > 0.0 { -1.0 } else { 1.0 };
    let slip_sign: f32 = slip_y * slip_x;
    let rot_vel = ball.rot_vel * PEG_SPIN_DAMPING + SLIP_SPIN_FACTOR * parallel.length() * slip_sign;

    BallState {
        pos: peg.pos - normalize(diff) * board.contact_distance(),
        vel,
        rot_vel,
        ..ball
    }
}

/// Keep the ball between the side walls
///
/// The x velocity is reflected and damped only while still heading into the
/// wall; a bounce adds a fixed spin kick whose sign marks the side.
pub fn resolve_wall_collision(ball: BallState, board: &Board) -> BallState {
    let (min_x, max_x) = board.x_bounds();
    let mut out = ball;

    if out.pos.x < min_x {
        out.pos.x = min_x;
        if out.vel.x < 0.0 {
            out.vel.x = -out.vel.x * board.collision_elasticity;
            out.rot_vel += WALL_SPIN_KICK;
        }
    } else if out.pos.x > max_x {
        out.pos.x = max_x;
        if out.vel.x > 0.0 {
            out.vel.x = -out.vel.x * board.collision_elasticity;
            out.rot_vel -= WALL_SPIN_KICK;
        }
    }

    out
}
