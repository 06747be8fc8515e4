//! Balls: red (scoring), black (obstacle) and gold (evasive bonus)

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::body::{Body, Movable};
use crate::consts::*;

/// Which kind of ball this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BallKind {
    /// Catchable scoring ball
    Red,
    /// Obstacle that knocks players down
    Black,
    /// Catchable, evasive, released late; carrying it home ends the match
    Gold,
}

impl BallKind {
    /// Sprite id used by the renderer
    pub fn model(self) -> u8 {
        match self {
            BallKind::Red => RED_MODEL,
            BallKind::Black => BLACK_MODEL,
            BallKind::Gold => GOLD_MODEL,
        }
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize)]
pub struct Ball {
    pub body: Body,
    pub kind: BallKind,
    pub alive: bool,
    /// Held by some player this tick
    caught: bool,
    /// Held by some player last tick
    last_caught: bool,
}

impl Ball {
    pub fn new(kind: BallKind, pos: Vec2, arena: Vec2, accel: f32, max_speed: f32) -> Self {
        let size = match kind {
            BallKind::Gold => GOLD_BALL_SIZE,
            _ => BALL_SIZE,
        };
        let mut body = Body::new(pos, Vec2::splat(size), arena);
        body.accel = accel;
        body.max_speed = max_speed;
        if kind == BallKind::Gold {
            body.accel *= 2.0;
            body.max_speed *= 2.0;
        }
        Self {
            body,
            kind,
            // Gold stays hidden until released
            alive: kind != BallKind::Gold,
            caught: false,
            last_caught: false,
        }
    }

    pub fn model(&self) -> u8 {
        self.kind.model()
    }

    pub fn is_catchable(&self) -> bool {
        matches!(self.kind, BallKind::Red | BallKind::Gold)
    }

    pub fn is_caught(&self) -> bool {
        self.caught
    }

    pub fn last_caught(&self) -> bool {
        self.last_caught
    }

    /// Shift this tick's catch flag into history before catch detection
    pub fn reset_caught(&mut self) {
        self.last_caught = self.caught;
        self.caught = false;
    }

    /// Mark as held this tick. Returns true on a fresh grab.
    pub fn set_caught(&mut self) -> bool {
        let fresh = !self.caught && !self.last_caught;
        self.caught = true;
        fresh
    }

    /// Back to spawn; gold goes back into hiding
    pub fn reset_ball(&mut self) {
        self.body.reset();
        self.body.pass_through = false;
        self.caught = false;
        self.last_caught = false;
        if self.kind == BallKind::Gold {
            self.alive = false;
        }
    }

    /// Advance one tick: evade (gold), wander, then integrate
    ///
    /// `players` are the positions of the active players.
    pub fn step<R: Rng>(&mut self, elapsed_ms: f32, now: u64, players: &[Vec2], rng: &mut R) {
        if !self.alive {
            return;
        }

        if self.kind == BallKind::Gold {
            self.evade(players);
        }

        if !self.body.pass_through {
            if self.body.decision_due(now) {
                match rng.random_range(0..BALL_WANDER_CHOICES) {
                    0 => self.up(),
                    1 => self.right(),
                    2 => self.left(),
                    _ => {}
                }
            }
            if self.body.pos.y > self.body.max.y - BALL_FLOOR_MARGIN {
                self.up();
            }
        }

        self.body.integrate(elapsed_ms);
    }

    /// Step away from every player that gets too close
    fn evade(&mut self, players: &[Vec2]) {
        let pos = self.body.pos;
        for &player in players {
            let d = pos - player;
            if d.x.abs() >= GOLD_EVADE_RANGE || d.y.abs() >= GOLD_EVADE_RANGE {
                continue;
            }
            if player.x < pos.x {
                self.right();
            }
            if player.x > pos.x {
                self.left();
            }
            if player.y > pos.y {
                self.up();
            }
            if player.y < pos.y {
                self.dive();
            }
        }
    }

    /// Gold balls dive regardless of the arena's dive setting
    fn dive(&mut self) {
        let body = &mut self.body;
        body.vel.y = (body.vel.y + body.accel).min(body.max_speed);
    }
}

impl Movable for Ball {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn reset(&mut self) {
        self.reset_ball();
    }
}
