//! Axis-aligned proximity tests
//!
//! Everything in Broomsticks collides as boxes measured from their top-left
//! corners. No penetration or normals: a hit either bumps a player, snaps a
//! ball to a hand, or scores.

use glam::Vec2;

use super::body::Body;
use super::state::Side;
use crate::consts::*;

/// True if `a` and `b` are closer than `half` on both axes
#[inline]
pub fn within_box(a: Vec2, b: Vec2, half: Vec2) -> bool {
    let d = a - b;
    d.x.abs() < half.x && d.y.abs() < half.y
}

/// Player-player overlap, using the first player's box inset by the bump tolerance
pub fn players_overlap(a: &Body, b: &Body) -> bool {
    within_box(a.pos, b.pos, a.size - Vec2::splat(BUMP_TOLERANCE))
}

/// Whether a ball is inside the player's hand box
///
/// Used for catching catchable balls and for black-ball hits alike.
pub fn ball_in_reach(player: &Body, ball: &Body) -> bool {
    within_box(
        player.pos + Vec2::splat(HAND_OFFSET),
        ball.pos,
        Vec2::splat(CATCH_RANGE),
    )
}

/// Where a carried ball sits relative to its carrier
pub fn carry_position(player: &Body) -> Vec2 {
    let dx = if player.vel.x > 0.0 {
        CARRY_OFFSET_RIGHT
    } else {
        CARRY_OFFSET_LEFT
    };
    player.pos + Vec2::new(dx, CARRY_OFFSET_Y)
}

/// Has a player of `side` pushed into the opposing goal edge?
pub fn at_opposing_goal(player: &Body, side: Side, arena_width: f32) -> bool {
    match side {
        Side::Left => player.pos.x > arena_width - GOAL_MARGIN - player.size.x,
        Side::Right => player.pos.x < GOAL_MARGIN,
    }
}

/// Whether a ball's y is inside the goal mouth around mid-height
#[inline]
pub fn in_goal_mouth(ball_y: f32, mid_height: f32) -> bool {
    (ball_y - mid_height).abs() < GOAL_MOUTH
}
